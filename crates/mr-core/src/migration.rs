//! Migration steps and the `{version}_{title}.{up|down}.sql` file convention

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Direction a migration file applies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Name as it appears in file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One migration file read from the source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// File name relative to the source directory
    pub file_name: String,

    /// Raw SQL body
    pub sql: String,
}

/// A single versioned migration step with its optional up/down bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Numeric version, unique within a source
    pub version: u64,

    /// Human-readable part of the file name
    pub title: String,

    /// Forward body (`.up.sql`)
    pub up: Option<MigrationFile>,

    /// Reverse body (`.down.sql`), parsed but never executed
    pub down: Option<MigrationFile>,
}

impl Migration {
    /// Create an empty step for `version`
    pub fn new(version: u64, title: impl Into<String>) -> Self {
        Self {
            version,
            title: title.into(),
            up: None,
            down: None,
        }
    }

    /// SQL to run when migrating up. Empty when the version only has a down file.
    pub fn up_sql(&self) -> &str {
        self.up.as_ref().map(|file| file.sql.as_str()).unwrap_or("")
    }

    /// `version/title` label used in logs and errors
    pub fn label(&self) -> String {
        if self.title.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.version, self.title)
        }
    }
}

/// Parsed components of a migration file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedFileName {
    pub version: u64,
    pub title: String,
    pub direction: Direction,
}

static FILE_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn file_name_regex() -> &'static Regex {
    FILE_NAME_RE.get_or_init(|| {
        Regex::new(r"^([0-9]+)_(.*)\.(up|down)\.sql$").expect("valid regex literal")
    })
}

/// Parse a file name following the migration convention.
///
/// Returns `Ok(None)` for files that are not migrations at all. A matching
/// name whose version does not fit a signed 64-bit ledger column is an error.
pub(crate) fn parse_file_name(file_name: &str) -> CoreResult<Option<ParsedFileName>> {
    let Some(captures) = file_name_regex().captures(file_name) else {
        return Ok(None);
    };

    let digits = &captures[1];
    let version = digits
        .parse::<u64>()
        .ok()
        .filter(|v| i64::try_from(*v).is_ok())
        .ok_or_else(|| CoreError::InvalidMigrationFile {
            file: file_name.to_string(),
            reason: format!("version {digits} exceeds the supported range"),
        })?;

    let direction = match &captures[3] {
        "up" => Direction::Up,
        _ => Direction::Down,
    };

    Ok(Some(ParsedFileName {
        version,
        title: captures[2].to_string(),
        direction,
    }))
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
