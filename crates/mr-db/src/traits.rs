//! Driver trait definition

use crate::error::DbResult;

/// Contents of the applied-version ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerState {
    /// Highest applied version, `None` when nothing has been applied
    pub version: Option<u64>,

    /// Set when a previous run stopped part way through `version`
    pub dirty: bool,
}

/// Database side of a migration run
///
/// Calls happen in the order `lock`, any number of `version`/`apply`, then
/// `unlock`. Implementations are used from a single thread.
pub trait Driver: Send {
    /// Take the exclusive runner lock, waiting up to the configured timeout.
    ///
    /// Creates the ledger table if it does not exist yet.
    fn lock(&mut self) -> DbResult<()>;

    /// Release the runner lock. Calling it without holding the lock is a no-op.
    fn unlock(&mut self) -> DbResult<()>;

    /// Read the ledger
    fn version(&mut self) -> DbResult<LedgerState>;

    /// Run `body` and record `version` as the clean watermark in one
    /// transaction. On error nothing from this step is kept. Bodies that
    /// open or close a transaction themselves are refused before running.
    fn apply(&mut self, version: u64, body: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
