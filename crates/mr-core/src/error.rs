//! Error types for mr-core

use crate::migration::Direction;
use thiserror::Error;

/// Core error type for descriptor and migration source handling
#[derive(Error, Debug)]
pub enum CoreError {
    /// S001: Connection descriptor is missing or blank
    #[error("[S001] Connection descriptor is empty")]
    EmptyDescriptor,

    /// S002: Connection descriptor is not a valid URL
    #[error("[S002] Malformed connection descriptor: {reason}")]
    MalformedDescriptor { reason: String },

    /// S003: No driver registered for the descriptor's scheme
    #[error("[S003] Unsupported database scheme '{scheme}' (supported: {supported})")]
    UnsupportedScheme { scheme: String, supported: String },

    /// S004: A recognised `x-` option has an invalid value, or the option is unknown
    #[error("[S004] Invalid connection option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    /// S005: Migration source location is malformed
    #[error("[S005] Invalid migration source '{url}': {reason}")]
    InvalidSource { url: String, reason: String },

    /// S006: Migration source uses a scheme other than `file`
    #[error("[S006] Unsupported migration source scheme '{scheme}'")]
    UnsupportedSourceScheme { scheme: String },

    /// S007: Migration directory does not exist
    #[error("[S007] Migration directory not found: {path}")]
    SourceNotFound { path: String },

    /// S008: File follows the naming convention but cannot be used
    #[error("[S008] Invalid migration file '{file}': {reason}")]
    InvalidMigrationFile { file: String, reason: String },

    /// S009: Two files declare the same version and direction
    #[error("[S009] Duplicate {direction} migration for version {version}: '{first}' and '{second}'")]
    DuplicateMigration {
        version: u64,
        direction: Direction,
        first: String,
        second: String,
    },

    /// S010: The database records a version the source does not contain
    #[error("[S010] Applied version {version} has no migration file in {path}")]
    UnknownVersion { version: u64, path: String },

    /// S011: IO error with file path context
    #[error("[S011] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
