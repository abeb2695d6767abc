/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("decision log append failed: {reason}")]
    AppendFailed { reason: String },

    #[error("corrupt log entry at seq {seq}: {reason}")]
    CorruptEntry { seq: u64, reason: String },
}
