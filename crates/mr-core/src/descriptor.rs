//! Connection descriptor parsed from `DATABASE_URL`
//!
//! A descriptor has the shape `duckdb://<path>[?options]`. Absolute paths use
//! an empty authority (`duckdb:///var/lib/app.duckdb`); anything else is
//! resolved relative to the working directory (`duckdb://data/app.duckdb`).
//!
//! Options prefixed with `x-` configure the migration runner itself; every
//! other query parameter is handed to the database as a setting.

use crate::error::{CoreError, CoreResult};
use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Ledger table used when `x-migrations-table` is not given
pub const DEFAULT_MIGRATIONS_TABLE: &str = "schema_migrations";

/// How long a runner waits for a concurrent runner to release its lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(15);

const OPT_MIGRATIONS_TABLE: &str = "x-migrations-table";
const OPT_LOCK_TIMEOUT: &str = "x-lock-timeout";

/// Database backends a descriptor can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    DuckDb,
}

impl Scheme {
    /// All schemes with a registered driver
    pub const ALL: &'static [Scheme] = &[Scheme::DuckDb];

    /// URL scheme name
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::DuckDb => "duckdb",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }

    fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(Scheme::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated form of the connection string.
///
/// Parsing never touches the filesystem or the database.
#[derive(Debug, Clone)]
pub struct ConnectionDescriptor {
    url: Url,
    scheme: Scheme,
    path: PathBuf,
    migrations_table: String,
    lock_timeout: Duration,
    settings: Vec<(String, String)>,
}

impl ConnectionDescriptor {
    /// Parse a raw connection string.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::EmptyDescriptor);
        }

        let url = Url::parse(raw).map_err(|e| CoreError::MalformedDescriptor {
            reason: e.to_string(),
        })?;

        let scheme = Scheme::from_name(url.scheme()).ok_or_else(|| CoreError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
            supported: Scheme::supported_list(),
        })?;

        let path = database_path(&url)?;

        let mut migrations_table = DEFAULT_MIGRATIONS_TABLE.to_string();
        let mut lock_timeout = DEFAULT_LOCK_TIMEOUT;
        let mut settings = Vec::new();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                OPT_MIGRATIONS_TABLE => migrations_table = parse_table_name(&value)?,
                OPT_LOCK_TIMEOUT => {
                    lock_timeout =
                        humantime::parse_duration(&value).map_err(|e| CoreError::InvalidOption {
                            key: OPT_LOCK_TIMEOUT.to_string(),
                            reason: e.to_string(),
                        })?;
                }
                other if other.starts_with("x-") => {
                    return Err(CoreError::InvalidOption {
                        key: other.to_string(),
                        reason: "unknown option".to_string(),
                    });
                }
                other => settings.push((other.to_string(), value.into_owned())),
            }
        }

        Ok(Self {
            url,
            scheme,
            path,
            migrations_table,
            lock_timeout,
            settings,
        })
    }

    /// Backend named by the URL scheme
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Database file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the applied-version ledger table
    pub fn migrations_table(&self) -> &str {
        &self.migrations_table
    }

    /// Maximum time to wait for the runner lock
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Backend settings passed through from the query string, in order
    pub fn settings(&self) -> &[(String, String)] {
        &self.settings
    }
}

/// Parsed descriptors never carry credentials, so the URL is safe to log.
impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Join authority and path back into a filesystem path.
///
/// `duckdb://data/app.duckdb` parses with `data` as the host, so the host is
/// the first path component of a relative location.
fn database_path(url: &Url) -> CoreResult<PathBuf> {
    // The credentials themselves stay out of the error message.
    if !url.username().is_empty() || url.password().is_some() {
        return Err(CoreError::MalformedDescriptor {
            reason: "user info is not supported for file databases".to_string(),
        });
    }
    if let Some(port) = url.port() {
        return Err(CoreError::MalformedDescriptor {
            reason: format!("port {port} is not supported for file databases"),
        });
    }

    let host = url.host_str().unwrap_or_default();
    let joined = format!("{host}{}", url.path());
    let decoded = percent_decode_str(&joined)
        .decode_utf8()
        .map_err(|e| CoreError::MalformedDescriptor {
            reason: format!("database path is not valid UTF-8: {e}"),
        })?;

    if decoded.is_empty() || decoded == "/" {
        return Err(CoreError::MalformedDescriptor {
            reason: "missing database path".to_string(),
        });
    }
    Ok(PathBuf::from(decoded.into_owned()))
}

/// Ledger table names are interpolated into SQL, so only plain identifiers pass.
fn parse_table_name(value: &str) -> CoreResult<String> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if !valid {
        return Err(CoreError::InvalidOption {
            key: OPT_MIGRATIONS_TABLE.to_string(),
            reason: format!("'{value}' is not a plain SQL identifier"),
        });
    }
    Ok(value.to_string())
}

#[cfg(test)]
#[path = "descriptor_test.rs"]
mod tests;
