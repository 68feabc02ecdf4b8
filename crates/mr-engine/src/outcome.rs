//! Successful results of [`crate::Migrator::up`].

use std::fmt;

/// What an `up` run did. Both variants are successes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// One or more steps were applied, in this order
    Applied { versions: Vec<u64> },

    /// The ledger already matched the latest migration
    NoChange { version: Option<u64> },
}

impl Outcome {
    /// True when nothing was pending
    pub fn is_no_change(&self) -> bool {
        matches!(self, Outcome::NoChange { .. })
    }

    /// Number of steps applied by this run
    pub fn applied_count(&self) -> usize {
        match self {
            Outcome::Applied { versions } => versions.len(),
            Outcome::NoChange { .. } => 0,
        }
    }

    /// Watermark after the run
    pub fn version(&self) -> Option<u64> {
        match self {
            Outcome::Applied { versions } => versions.last().copied(),
            Outcome::NoChange { version } => *version,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied { versions } => {
                let noun = if versions.len() == 1 { "migration" } else { "migrations" };
                write!(f, "Applied {} {noun}", versions.len())?;
                if let Some(last) = versions.last() {
                    write!(f, "; database is at version {last}")?;
                }
                Ok(())
            }
            Outcome::NoChange { version: Some(v) } => {
                write!(f, "No pending migrations; database is at version {v}")
            }
            Outcome::NoChange { version: None } => {
                write!(f, "No pending migrations; no migrations have been applied")
            }
        }
    }
}
