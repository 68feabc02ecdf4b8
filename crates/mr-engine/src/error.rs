//! Error types for the migration engine.

use mr_core::CoreError;
use mr_db::DbError;
use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Descriptor or source problem, reported by mr-core
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Driver failure outside a migration step, reported by mr-db
    #[error(transparent)]
    Db(#[from] DbError),

    /// A previous run left the ledger marked dirty (E001).
    #[error("[E001] Dirty database version {}. Repair the schema and reset the ledger before migrating", display_version(.version))]
    Dirty { version: Option<u64> },

    /// A migration step failed and was rolled back (E002).
    #[error("[E002] Migration {label} failed")]
    Step {
        version: u64,
        label: String,
        #[source]
        source: DbError,
    },
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;

fn display_version(version: &Option<u64>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "<none>".to_string(),
    }
}
