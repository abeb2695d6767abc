//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use triage_core::errors::TriageResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Owns the single write connection and, for file-backed databases, a read pool.
///
/// In-memory databases have no read pool: a second in-memory connection would
/// be a separate database, so all reads go through the writer.
pub struct ConnectionPool {
    pub writer: Arc<WriteConnection>,
    pub readers: Option<Arc<ReadPool>>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, read_pool_size: usize, busy_timeout_ms: u32) -> TriageResult<Self> {
        let writer = Arc::new(WriteConnection::open(path, busy_timeout_ms)?);
        let readers = Arc::new(ReadPool::open(path, read_pool_size, busy_timeout_ms)?);
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool (for testing).
    pub fn open_in_memory() -> TriageResult<Self> {
        Ok(Self {
            writer: Arc::new(WriteConnection::open_in_memory()?),
            readers: None,
            db_path: None,
        })
    }
}
