//! DuckDB driver implementation

use crate::error::{is_lock_conflict, DbError, DbResult};
use crate::lock::PathLock;
use crate::statements::transaction_control;
use crate::traits::{Driver, LedgerState};
use duckdb::{Config, Connection};
use mr_core::ConnectionDescriptor;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Pause between attempts while another runner holds the lock
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// DuckDB migration driver
///
/// The connection only exists while the runner lock is held, so an idle
/// driver never keeps the database file open.
pub struct DuckDbDriver {
    path: PathBuf,
    lock_key: PathBuf,
    table: String,
    lock_timeout: Duration,
    settings: Vec<(String, String)>,
    // Declared before `guard` so the file is closed before the path is released.
    conn: Option<Connection>,
    guard: Option<PathLock>,
}

impl DuckDbDriver {
    /// Create a driver for `descriptor` without touching the database.
    ///
    /// Backend settings are validated here so a bad setting is reported
    /// before any I/O.
    pub fn new(descriptor: &ConnectionDescriptor) -> DbResult<Self> {
        let settings = descriptor.settings().to_vec();
        build_config(&settings)?;

        let path = descriptor.path().to_path_buf();
        let lock_key = std::path::absolute(&path).unwrap_or_else(|_| path.clone());

        Ok(Self {
            path,
            lock_key,
            table: descriptor.migrations_table().to_string(),
            lock_timeout: descriptor.lock_timeout(),
            settings,
            conn: None,
            guard: None,
        })
    }

    /// Database file this driver migrates
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ledger table name
    pub fn table(&self) -> &str {
        &self.table
    }

    fn conn(&self, operation: &'static str) -> DbResult<&Connection> {
        self.conn.as_ref().ok_or(DbError::NotLocked(operation))
    }

    /// One attempt at taking both lock layers and preparing the ledger.
    fn try_lock(&mut self) -> DbResult<()> {
        let guard = PathLock::try_acquire(&self.lock_key)?.ok_or_else(|| {
            DbError::Locked(format!(
                "{} is held by another runner in this process",
                self.path.display()
            ))
        })?;

        let conn = Connection::open_with_flags(&self.path, build_config(&self.settings)?)
            .map_err(|e| {
                let msg = e.to_string();
                if is_lock_conflict(&msg) {
                    DbError::Locked(msg)
                } else {
                    DbError::ConnectionError(format!("{}: {msg}", self.path.display()))
                }
            })?;

        ensure_version_table(&conn, &self.table)?;

        self.conn = Some(conn);
        self.guard = Some(guard);
        Ok(())
    }
}

impl Driver for DuckDbDriver {
    fn lock(&mut self) -> DbResult<()> {
        if self.conn.is_some() {
            return Err(DbError::Locked("lock is already held by this runner".to_string()));
        }

        // A timeout too large to represent as an instant never expires.
        let deadline = Instant::now().checked_add(self.lock_timeout);
        loop {
            match self.try_lock() {
                Ok(()) => {
                    log::debug!("Acquired migration lock on {}", self.path.display());
                    return Ok(());
                }
                Err(DbError::Locked(reason)) => {
                    let mut pause = LOCK_RETRY_INTERVAL;
                    if let Some(deadline) = deadline {
                        let now = Instant::now();
                        if now >= deadline {
                            return Err(DbError::Locked(reason));
                        }
                        pause = pause.min(deadline - now);
                    }
                    log::debug!("Waiting for migration lock: {reason}");
                    thread::sleep(pause);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn unlock(&mut self) -> DbResult<()> {
        if self.conn.take().is_some() {
            log::debug!("Released migration lock on {}", self.path.display());
        }
        self.guard = None;
        Ok(())
    }

    fn version(&mut self) -> DbResult<LedgerState> {
        let conn = self.conn("version")?;
        let mut stmt = conn.prepare(&format!(
            "SELECT version, dirty FROM \"{}\" LIMIT 2",
            self.table
        ))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, bool>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        match rows.as_slice() {
            [] => Ok(LedgerState::default()),
            // -1 is the "no version" marker other tools write alongside a dirty flag.
            [(-1, dirty)] => Ok(LedgerState {
                version: None,
                dirty: *dirty,
            }),
            [(version, dirty)] => {
                let version = u64::try_from(*version).map_err(|_| {
                    DbError::LedgerError(format!(
                        "table \"{}\" holds negative version {version}",
                        self.table
                    ))
                })?;
                Ok(LedgerState {
                    version: Some(version),
                    dirty: *dirty,
                })
            }
            _ => Err(DbError::LedgerError(format!(
                "table \"{}\" must hold at most one row",
                self.table
            ))),
        }
    }

    fn apply(&mut self, version: u64, body: &str) -> DbResult<()> {
        let recorded = i64::try_from(version).map_err(|_| {
            DbError::LedgerError(format!("version {version} does not fit in a BIGINT column"))
        })?;
        let table = self.table.clone();
        let conn = self.conn("apply")?;

        // The step's own COMMIT would also commit the ledger row ahead of a
        // reported failure.
        if let Some(keyword) = transaction_control(body) {
            return Err(DbError::TransactionControl(keyword));
        }

        with_transaction(conn, |conn| {
            if !body.trim().is_empty() {
                conn.execute_batch(body)
                    .map_err(|e| DbError::ExecutionError(e.to_string()))?;
            }
            conn.execute(&format!("DELETE FROM \"{table}\""), [])?;
            conn.execute(
                &format!("INSERT INTO \"{table}\" (version, dirty) VALUES (?, false)"),
                duckdb::params![recorded],
            )?;
            Ok(())
        })
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Build a DuckDB config carrying the pass-through settings.
fn build_config(settings: &[(String, String)]) -> DbResult<Config> {
    let mut config = Config::default();
    for (key, value) in settings {
        config = config
            .with(key, value)
            .map_err(|e| DbError::ConfigError(format!("{key}={value}: {e}")))?;
    }
    Ok(config)
}

/// Create the single-row ledger table if it does not exist.
fn ensure_version_table(conn: &Connection, table: &str) -> DbResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS \"{table}\" (
             version BIGINT NOT NULL PRIMARY KEY,
             dirty   BOOLEAN NOT NULL
         );"
    ))
    .map_err(|e| DbError::ExecutionError(format!("failed to create ledger table \"{table}\": {e}")))
}

/// Execute `body` within `BEGIN` / `COMMIT`, rolling back on error.
fn with_transaction<F>(conn: &Connection, body: F) -> DbResult<()>
where
    F: FnOnce(&Connection) -> DbResult<()>,
{
    conn.execute_batch("BEGIN TRANSACTION")
        .map_err(|e| DbError::ExecutionError(format!("BEGIN failed: {e}")))?;

    let result = body(conn);

    match &result {
        Ok(()) => {
            if let Err(commit_err) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(DbError::ExecutionError(format!(
                    "COMMIT failed: {commit_err}"
                )));
            }
        }
        Err(_) => {
            let _ = conn.execute_batch("ROLLBACK");
        }
    }
    result
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
