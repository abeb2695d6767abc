//! # triage-observability
//!
//! Tracing subscriber setup, per-operation spans, named structured events,
//! and the [`ErrorChannel`] that guarantees no error record is dropped silently.

pub mod error_channel;
pub mod tracing_setup;

pub use error_channel::ErrorChannel;
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
