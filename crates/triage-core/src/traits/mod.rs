mod assessor;
mod calibration_store;
mod decision_log;
mod error_sink;
mod executor;
mod item_source;

pub use assessor::IAssessor;
pub use calibration_store::ICalibrationStore;
pub use decision_log::IDecisionLog;
pub use error_sink::IErrorSink;
pub use executor::{ExecutionReceipt, ExecutionRequest, IActionExecutor};
pub use item_source::IItemSource;
