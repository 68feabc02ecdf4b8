//! The migration runner.

use crate::error::{MigrateError, MigrateResult};
use crate::outcome::Outcome;
use mr_core::{ConnectionDescriptor, FileSource, SourceLocation};
use mr_db::Driver;
use std::fmt;
use std::time::Instant;

/// Applies migrations from a [`FileSource`] through a [`Driver`].
pub struct Migrator {
    source: FileSource,
    driver: Box<dyn Driver>,
}

impl Migrator {
    /// Build a migrator from a source URL (`file://...`) and a database URL.
    ///
    /// The database URL is validated first, so an unsupported scheme is
    /// reported before the source directory is read. Nothing here connects
    /// to the database.
    pub fn new(source_url: &str, database_url: &str) -> MigrateResult<Self> {
        let descriptor = ConnectionDescriptor::parse(database_url)?;
        let location = SourceLocation::parse(source_url)?;
        let source = FileSource::open(location)?;
        let driver = mr_db::open(&descriptor)?;

        log::debug!(
            "Migrating {descriptor} ({}) from {} with {} migrations",
            driver.db_type(),
            source.location(),
            source.len()
        );
        Ok(Self::with_driver(source, driver))
    }

    /// Build a migrator around an already constructed driver.
    pub fn with_driver(source: FileSource, driver: Box<dyn Driver>) -> Self {
        Self { source, driver }
    }

    /// Migration source this runner reads from
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Apply every migration above the database's current version.
    ///
    /// Holds the driver lock for the whole run and releases it on every path.
    /// Stops at the first failing step; steps before it stay applied.
    pub fn up(&mut self) -> MigrateResult<Outcome> {
        self.driver.lock()?;

        let result = self.up_locked();
        let unlocked = self.driver.unlock();

        let outcome = result?;
        unlocked?;
        Ok(outcome)
    }

    fn up_locked(&mut self) -> MigrateResult<Outcome> {
        let ledger = self.driver.version()?;
        if ledger.dirty {
            return Err(MigrateError::Dirty {
                version: ledger.version,
            });
        }

        let pending = self.source.pending_after(ledger.version)?;
        if pending.is_empty() {
            return Ok(Outcome::NoChange {
                version: ledger.version,
            });
        }

        log::debug!(
            "{} pending migrations after version {:?}",
            pending.len(),
            ledger.version
        );

        let mut versions = Vec::with_capacity(pending.len());
        for migration in pending {
            let label = migration.label();
            log::info!("Applying migration {label}");

            let started = Instant::now();
            self.driver
                .apply(migration.version, migration.up_sql())
                .map_err(|source| MigrateError::Step {
                    version: migration.version,
                    label: label.clone(),
                    source,
                })?;

            log::info!("Applied migration {label} ({:.2?})", started.elapsed());
            versions.push(migration.version);
        }

        Ok(Outcome::Applied { versions })
    }
}

impl fmt::Debug for Migrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("source", &self.source.location())
            .field("migrations", &self.source.len())
            .field("driver", &self.driver.db_type())
            .finish()
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
