//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use triage_core::config::ObservabilityConfig;
use triage_core::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Initialize the global subscriber.
///
/// `TRIAGE_LOG` wins over `config.log_level` when set. Output is JSON lines
/// when `config.json_logs` is on, human-readable otherwise. Idempotent; if a
/// subscriber is already installed (tests, embedding hosts) it is left alone.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr);

        let installed = if config.json_logs {
            builder
                .with_file(true)
                .with_line_number(true)
                .json()
                .try_init()
        } else {
            builder.try_init()
        };
        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}

/// Initialize with an explicit filter string (for tests or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .try_init();
}
