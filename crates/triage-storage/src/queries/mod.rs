//! Plain SQL functions over a borrowed connection. The engine decides which
//! connection (writer or reader) each one runs on.

pub mod error_ops;
pub mod log_ops;
pub mod weight_ops;

/// Row cap for a `LIMIT` parameter; anything past `i64::MAX` means no cap.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
