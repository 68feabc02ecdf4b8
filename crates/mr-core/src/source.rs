//! Migration source backed by a local directory
//!
//! The source location is a `file://` URL. Every file in the directory named
//! `{version}_{title}.up.sql` or `{version}_{title}.down.sql` becomes part of
//! the step with that version; other files are ignored.

use crate::error::{CoreError, CoreResult};
use crate::migration::{parse_file_name, Direction, Migration, MigrationFile};
use percent_encoding::percent_decode_str;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::path::{Path, PathBuf};

/// Where migration files are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    url: String,
    path: PathBuf,
}

impl SourceLocation {
    /// Parse a `file://<path>` location. Relative paths resolve against the
    /// working directory.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let (scheme, rest) = raw.split_once("://").ok_or_else(|| CoreError::InvalidSource {
            url: raw.to_string(),
            reason: "expected <scheme>://<path>".to_string(),
        })?;

        if !scheme.eq_ignore_ascii_case("file") {
            return Err(CoreError::UnsupportedSourceScheme {
                scheme: scheme.to_string(),
            });
        }

        let decoded = percent_decode_str(rest)
            .decode_utf8()
            .map_err(|e| CoreError::InvalidSource {
                url: raw.to_string(),
                reason: e.to_string(),
            })?;
        if decoded.is_empty() {
            return Err(CoreError::InvalidSource {
                url: raw.to_string(),
                reason: "missing directory path".to_string(),
            });
        }

        Ok(Self {
            url: raw.to_string(),
            path: PathBuf::from(decoded.into_owned()),
        })
    }

    /// Directory containing the migration files
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// All migrations found in a source directory, ordered by version
#[derive(Debug, Clone)]
pub struct FileSource {
    location: SourceLocation,
    migrations: BTreeMap<u64, Migration>,
}

impl FileSource {
    /// Read and index every migration file under `location`.
    pub fn open(location: SourceLocation) -> CoreResult<Self> {
        let dir = location.path();
        if !dir.is_dir() {
            return Err(CoreError::SourceNotFound {
                path: dir.display().to_string(),
            });
        }

        let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;

        // Sorted so duplicate reports name files in a stable order.
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::IoWithPath {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                log::debug!("Skipping non UTF-8 file name in {}", dir.display());
                continue;
            };
            files.push((name.to_string(), path));
        }
        files.sort();

        let mut migrations: BTreeMap<u64, Migration> = BTreeMap::new();
        for (name, path) in files {
            let Some(parsed) = parse_file_name(&name)? else {
                log::debug!("Ignoring {name}: not a migration file");
                continue;
            };

            let sql = std::fs::read_to_string(&path).map_err(|e| CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            })?;

            let migration = migrations
                .entry(parsed.version)
                .or_insert_with(|| Migration::new(parsed.version, parsed.title.as_str()));
            let slot = match parsed.direction {
                Direction::Up => &mut migration.up,
                Direction::Down => &mut migration.down,
            };
            if let Some(existing) = slot.as_ref() {
                return Err(CoreError::DuplicateMigration {
                    version: parsed.version,
                    direction: parsed.direction,
                    first: existing.file_name.clone(),
                    second: name,
                });
            }
            if parsed.direction == Direction::Up {
                migration.title = parsed.title;
            }
            *slot = Some(MigrationFile {
                file_name: name,
                sql,
            });
        }

        log::debug!(
            "Loaded {} migrations from {}",
            migrations.len(),
            location
        );
        Ok(Self {
            location,
            migrations,
        })
    }

    /// Location this source was read from
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Number of distinct versions
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// True when the directory holds no migrations
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Migrations in ascending version order
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.values()
    }

    /// Look up a single version
    pub fn get(&self, version: u64) -> Option<&Migration> {
        self.migrations.get(&version)
    }

    /// True when the source has a step for `version`
    pub fn contains(&self, version: u64) -> bool {
        self.migrations.contains_key(&version)
    }

    /// Lowest version
    pub fn first(&self) -> Option<&Migration> {
        self.migrations.values().next()
    }

    /// Highest version
    pub fn latest(&self) -> Option<&Migration> {
        self.migrations.values().next_back()
    }

    /// The version immediately after `version`, if any
    pub fn next(&self, version: u64) -> Option<&Migration> {
        self.migrations
            .range((Bound::Excluded(version), Bound::Unbounded))
            .map(|(_, m)| m)
            .next()
    }

    /// Steps strictly above `watermark`, ascending.
    ///
    /// A `None` watermark means nothing has been applied yet. A watermark that
    /// does not exist in this source is an error: the database has been
    /// migrated by files this source does not know about.
    pub fn pending_after(&self, watermark: Option<u64>) -> CoreResult<Vec<&Migration>> {
        match watermark {
            None => Ok(self.iter().collect()),
            Some(version) => {
                if !self.contains(version) {
                    return Err(CoreError::UnknownVersion {
                        version,
                        path: self.location.path().display().to_string(),
                    });
                }
                Ok(self
                    .migrations
                    .range((Bound::Excluded(version), Bound::Unbounded))
                    .map(|(_, m)| m)
                    .collect())
            }
        }
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
