//! Subcommands and their wiring onto [`TriageRuntime`].

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Subcommand};
use serde_json::{json, Value};

use triage_core::config::TriageConfig;
use triage_core::models::CorrectionKind;
use triage_core::traits::IItemSource;
use triage_pipeline::{
    ExecutorRouter, FilesystemExecutor, JsonInboxSource, MemoryItemSource, TriageRuntime,
};

use crate::Cli;

const DEFAULT_INBOX: &str = "inbox.json";
const DEFAULT_OUT_DIR: &str = "notes";
const DEFAULT_LOG_PAGE: usize = 100;

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate a batch of unprocessed items and execute the decisions
    Process {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Fold new log entries into rule weights
    Calibrate,

    /// Print decision log entries
    Log {
        /// First sequence number to print
        #[arg(long, default_value_t = 1)]
        from: u64,
        #[arg(long, default_value_t = DEFAULT_LOG_PAGE)]
        limit: usize,
    },

    /// Validate a rule document without installing it
    CheckRules { path: std::path::PathBuf },

    /// Drop calibrated weights (every rule unless --rule is given)
    ResetWeights {
        #[arg(long)]
        rule: Option<String>,
    },

    /// Re-execute decisions whose execution was deferred
    RetryDeferred {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Record feedback on a logged decision
    Correct(CorrectArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("verdict").required(true).args(["confirm", "override_to"])))]
pub struct CorrectArgs {
    /// Sequence number of the decision being corrected
    #[arg(long)]
    pub seq: u64,

    /// The routed destination was right
    #[arg(long)]
    pub confirm: bool,

    /// The item belonged somewhere else
    #[arg(long = "override", value_name = "DEST")]
    pub override_to: Option<String>,
}

impl CorrectArgs {
    fn kind(&self) -> CorrectionKind {
        match &self.override_to {
            Some(dest) => CorrectionKind::Overridden {
                destination: Some(dest.clone()),
            },
            None => CorrectionKind::Confirmed,
        }
    }
}

/// Read the configuration file (if any) and apply command-line overrides.
pub fn load_config(cli: &Cli) -> Result<TriageConfig> {
    let mut config = match &cli.config {
        Some(path) => TriageConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => TriageConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.storage.db_path = db.display().to_string();
    }
    if let Some(rules) = &cli.rules {
        config.pipeline.rules_path = rules.display().to_string();
    }
    Ok(config)
}

pub async fn run(cli: &Cli, config: TriageConfig) -> Result<Value> {
    match &cli.command {
        Command::Process { limit } => {
            let runtime = open_runtime(cli, config, true).await?;
            Ok(serde_json::to_value(runtime.process_batch(*limit).await?)?)
        }
        Command::Calibrate => {
            let runtime = open_runtime(cli, config, false).await?;
            Ok(serde_json::to_value(runtime.run_calibration().await?)?)
        }
        Command::Log { from, limit } => {
            let runtime = open_runtime(cli, config, false).await?;
            Ok(serde_json::to_value(runtime.read_log(*from, *limit).await?)?)
        }
        Command::CheckRules { path } => check_rules(path),
        Command::ResetWeights { rule } => {
            let runtime = open_runtime(cli, config, false).await?;
            let removed = runtime.reset_weights(rule.clone()).await?;
            Ok(json!({ "removed": removed, "rule_set_version": runtime.rules().version()? }))
        }
        Command::RetryDeferred { limit } => {
            let runtime = open_runtime(cli, config, true).await?;
            Ok(serde_json::to_value(runtime.retry_deferred(*limit).await?)?)
        }
        Command::Correct(args) => {
            let runtime = open_runtime(cli, config, false).await?;
            let seq = runtime.record_correction(args.seq, args.kind()).await?;
            Ok(json!({ "seq": seq, "corrects_seq": args.seq }))
        }
    }
}

fn check_rules(path: &Path) -> Result<Value> {
    let table = TriageRuntime::check_rules(path)
        .with_context(|| format!("rule document {} is invalid", path.display()))?;
    let rules: Vec<Value> = table
        .rules()
        .iter()
        .map(|r| {
            json!({
                "id": r.rule.id,
                "destination": r.rule.destination,
                "weight": r.rule.weight,
            })
        })
        .collect();
    Ok(json!({ "document_hash": table.document_hash(), "rules": rules }))
}

/// Commands that never touch items run against an empty source, so a
/// missing inbox file only matters for `process` and `retry-deferred`.
async fn open_runtime(
    cli: &Cli,
    config: TriageConfig,
    with_inbox: bool,
) -> Result<Arc<TriageRuntime>> {
    let source: Arc<dyn IItemSource> = if with_inbox {
        let path = cli
            .inbox
            .clone()
            .unwrap_or_else(|| DEFAULT_INBOX.into());
        Arc::new(
            JsonInboxSource::open(&path)
                .with_context(|| format!("opening inbox {}", path.display()))?,
        )
    } else {
        Arc::new(MemoryItemSource::new(Vec::new()))
    };

    let out = cli.out.clone().unwrap_or_else(|| DEFAULT_OUT_DIR.into());
    let executors = ExecutorRouter::from_config(&config.pipeline)
        .with(Arc::new(FilesystemExecutor::new(out)))?;

    let runtime = TriageRuntime::open(config, source, executors)
        .await
        .context("starting triage runtime")?;
    tracing::debug!(rule_set_version = runtime.rules().version()?, "runtime ready");
    let runtime = Arc::new(runtime);
    shutdown_on_interrupt(&runtime);
    Ok(runtime)
}

/// Ctrl-C cancels the runtime's shutdown token: items not yet started stay
/// unprocessed and items in flight roll back, so the command still returns
/// its report.
fn shutdown_on_interrupt(runtime: &Arc<TriageRuntime>) {
    let runtime = Arc::downgrade(runtime);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        if let Some(runtime) = runtime.upgrade() {
            tracing::warn!("interrupted, winding down in-flight items");
            runtime.shutdown();
        }
    });
}
