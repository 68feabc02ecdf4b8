//! Process-wide registry of databases held by a runner.
//!
//! DuckDB's file lock only excludes other processes, so runners inside one
//! process coordinate here first.

use crate::error::{DbError, DbResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

static HELD: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();

fn held() -> &'static Mutex<HashSet<PathBuf>> {
    HELD.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Registration for one database path, released on drop
#[derive(Debug)]
pub(crate) struct PathLock {
    path: PathBuf,
}

impl PathLock {
    /// Register `path`, or return `None` if another runner already holds it.
    pub(crate) fn try_acquire(path: &Path) -> DbResult<Option<Self>> {
        let mut held = held()
            .lock()
            .map_err(|e| DbError::Internal(format!("lock registry poisoned: {e}")))?;
        if held.insert(path.to_path_buf()) {
            Ok(Some(Self {
                path: path.to_path_buf(),
            }))
        } else {
            Ok(None)
        }
    }
}

impl Drop for PathLock {
    fn drop(&mut self) {
        let mut held = held().lock().unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.path);
    }
}
