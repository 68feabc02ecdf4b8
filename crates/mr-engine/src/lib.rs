//! mr-engine - Migration engine for migrun
//!
//! [`Migrator`] binds a migration source to a database driver and applies
//! every pending "up" step in ascending version order.

pub mod error;
pub mod migrator;
pub mod outcome;

pub use error::{MigrateError, MigrateResult};
pub use migrator::Migrator;
pub use outcome::Outcome;
