//! Routes error records to the durable sink, falling back to the log.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use triage_core::models::{ErrorKind, ErrorRecord};
use triage_core::traits::IErrorSink;

use crate::tracing_setup::events;

/// Front door of the error record stream.
///
/// Every record is persisted through the sink. When the sink fails the record
/// is emitted at `error` level with all of its fields instead.
#[derive(Clone)]
pub struct ErrorChannel {
    sink: Arc<dyn IErrorSink>,
    unpersisted: Arc<AtomicU64>,
}

impl ErrorChannel {
    pub fn new(sink: Arc<dyn IErrorSink>) -> Self {
        Self {
            sink,
            unpersisted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record one error. Returns whether the sink accepted it.
    pub fn report(&self, record: &ErrorRecord) -> bool {
        match self.sink.record(record) {
            Ok(()) => {
                events::error_recorded(record);
                true
            }
            Err(e) => {
                self.unpersisted.fetch_add(1, Ordering::Relaxed);
                events::error_record_unpersisted(record, &e.to_string());
                false
            }
        }
    }

    /// Build and record in one step.
    pub fn emit(&self, kind: ErrorKind, item_id: Option<&str>, context: impl Into<String>) -> bool {
        self.report(&ErrorRecord::new(kind, item_id, context))
    }

    /// Records that only reached the log because the sink failed.
    pub fn unpersisted(&self) -> u64 {
        self.unpersisted.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("unpersisted", &self.unpersisted())
            .finish_non_exhaustive()
    }
}
