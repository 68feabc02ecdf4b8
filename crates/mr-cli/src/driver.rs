//! Runs the migration process for the `migrate` binary

use mr_engine::{MigrateError, Migrator, Outcome};
use thiserror::Error;

/// Fixed location of the migration files, relative to the working directory
pub const MIGRATIONS_SOURCE: &str = "file://migrations";

/// Environment variable holding the database connection descriptor
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Fatal conditions of a migration run
#[derive(Error, Debug)]
pub enum DriverError {
    /// C001: DATABASE_URL unset or blank
    #[error("[C001] {DATABASE_URL_VAR} env var is required")]
    MissingDatabaseUrl,

    /// C002: The runner could not be built from the source and descriptor
    #[error("[C002] Failed to construct migration runner")]
    Construction(#[source] MigrateError),

    /// C003: Applying pending migrations failed
    #[error("[C003] Migration failed")]
    Execution(#[source] MigrateError),
}

/// Read the descriptor, build the runner and apply everything pending.
///
/// `database_url` is the raw value of [`DATABASE_URL_VAR`]; surrounding
/// whitespace is ignored and a blank value counts as missing.
pub fn run(database_url: Option<String>, source_url: &str) -> Result<Outcome, DriverError> {
    let database_url = database_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(DriverError::MissingDatabaseUrl)?;

    let mut migrator = Migrator::new(source_url, database_url).map_err(DriverError::Construction)?;

    log::info!("Running migrations...");
    migrator.up().map_err(DriverError::Execution)
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
