use crate::errors::TriageResult;
use crate::models::ErrorRecord;

/// Destination of the error record stream.
pub trait IErrorSink: Send + Sync {
    fn record(&self, record: &ErrorRecord) -> TriageResult<()>;
}
