//! mr-core - Core types for migrun
//!
//! This crate provides the connection descriptor parsed from `DATABASE_URL`,
//! the migration source location, and the on-disk migration file source
//! shared by the driver and engine crates.

pub mod descriptor;
pub mod error;
pub mod migration;
pub mod source;

pub use descriptor::{ConnectionDescriptor, Scheme, DEFAULT_LOCK_TIMEOUT, DEFAULT_MIGRATIONS_TABLE};
pub use error::{CoreError, CoreResult};
pub use migration::{Direction, Migration, MigrationFile};
pub use source::{FileSource, SourceLocation};
