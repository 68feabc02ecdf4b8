//! Error types for mr-db

use thiserror::Error;

/// Database driver errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Another runner holds the lock (D003)
    #[error("[D003] Database is locked by another migration runner: {0}")]
    Locked(String),

    /// Ledger table contents are not usable (D004)
    #[error("[D004] Migration ledger is invalid: {0}")]
    LedgerError(String),

    /// Backend setting rejected (D005)
    #[error("[D005] Invalid database setting: {0}")]
    ConfigError(String),

    /// Operation requires the runner lock (D006)
    #[error("[D006] Database is not locked; lock() must be called before {0}")]
    NotLocked(&'static str),

    /// Internal error (D007)
    #[error("[D007] Internal database error: {0}")]
    Internal(String),

    /// Step body opens or closes a transaction itself (D008)
    #[error("[D008] Migration body contains a {0} statement; steps already run inside a transaction, remove transaction control from the file")]
    TransactionControl(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

/// DuckDB reports a held file lock only through its message text.
pub(crate) fn is_lock_conflict(msg: &str) -> bool {
    msg.contains("Could not set lock on file") || msg.contains("Conflicting lock is held")
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        let msg = err.to_string();
        if is_lock_conflict(&msg) {
            DbError::Locked(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
