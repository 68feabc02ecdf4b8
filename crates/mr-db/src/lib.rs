//! mr-db - Database driver layer for migrun
//!
//! This crate provides the `Driver` trait the migration engine talks to and
//! its DuckDB implementation.

pub mod duckdb;
pub mod error;
mod lock;
mod statements;
pub mod traits;

pub use crate::duckdb::DuckDbDriver;
pub use error::{DbError, DbResult};
pub use traits::{Driver, LedgerState};

use mr_core::{ConnectionDescriptor, Scheme};

/// Build the driver registered for the descriptor's scheme.
///
/// No connection is opened here; drivers connect when they take the lock.
pub fn open(descriptor: &ConnectionDescriptor) -> DbResult<Box<dyn Driver>> {
    match descriptor.scheme() {
        Scheme::DuckDb => Ok(Box::new(DuckDbDriver::new(descriptor)?)),
    }
}
