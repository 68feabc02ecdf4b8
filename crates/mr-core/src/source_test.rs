use super::*;
use std::fs;

/// Write `files` into a fresh temp dir and return it with its `file://` location.
fn source_dir(files: &[(&str, &str)]) -> (tempfile::TempDir, SourceLocation) {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in files {
        fs::write(dir.path().join(name), body).unwrap();
    }
    let location = SourceLocation::parse(&format!("file://{}", dir.path().display())).unwrap();
    (dir, location)
}

fn versions(migrations: &[&Migration]) -> Vec<u64> {
    migrations.iter().map(|m| m.version).collect()
}

// ── SourceLocation ─────────────────────────────────────────────────────

#[test]
fn test_location_relative() {
    let location = SourceLocation::parse("file://migrations").unwrap();
    assert_eq!(location.path(), Path::new("migrations"));
    assert_eq!(location.to_string(), "file://migrations");
}

#[test]
fn test_location_absolute() {
    let location = SourceLocation::parse("file:///srv/app/migrations").unwrap();
    assert_eq!(location.path(), Path::new("/srv/app/migrations"));
}

#[test]
fn test_location_rejects_other_schemes() {
    let err = SourceLocation::parse("s3://bucket/migrations").unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedSourceScheme { .. }));
}

#[test]
fn test_location_rejects_malformed() {
    assert!(matches!(
        SourceLocation::parse("migrations"),
        Err(CoreError::InvalidSource { .. })
    ));
    assert!(matches!(
        SourceLocation::parse("file://"),
        Err(CoreError::InvalidSource { .. })
    ));
}

// ── FileSource ─────────────────────────────────────────────────────────

#[test]
fn test_open_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let location = SourceLocation::parse(&format!("file://{}", missing.display())).unwrap();
    let err = FileSource::open(location).unwrap_err();
    assert!(matches!(err, CoreError::SourceNotFound { .. }));
}

#[test]
fn test_open_orders_by_numeric_version() {
    let (_dir, location) = source_dir(&[
        ("10_third.up.sql", "SELECT 10;"),
        ("2_second.up.sql", "SELECT 2;"),
        ("1_first.up.sql", "SELECT 1;"),
    ]);
    let source = FileSource::open(location).unwrap();

    let order: Vec<u64> = source.iter().map(|m| m.version).collect();
    assert_eq!(order, vec![1, 2, 10]);
    assert_eq!(source.first().unwrap().title, "first");
    assert_eq!(source.latest().unwrap().version, 10);
    assert_eq!(source.len(), 3);
}

#[test]
fn test_open_pairs_up_and_down() {
    let (_dir, location) = source_dir(&[
        ("1_users.up.sql", "CREATE TABLE users (id INTEGER);"),
        ("1_users.down.sql", "DROP TABLE users;"),
    ]);
    let source = FileSource::open(location).unwrap();

    let m = source.get(1).unwrap();
    assert_eq!(m.title, "users");
    assert_eq!(m.up_sql(), "CREATE TABLE users (id INTEGER);");
    assert_eq!(m.down.as_ref().unwrap().file_name, "1_users.down.sql");
}

#[test]
fn test_open_ignores_unrelated_files() {
    let (dir, location) = source_dir(&[
        ("1_users.up.sql", "SELECT 1;"),
        ("README.md", "# migrations"),
        ("notes.sql", "SELECT 0;"),
    ]);
    fs::create_dir(dir.path().join("2_nested.up.sql")).unwrap();

    let source = FileSource::open(location).unwrap();
    assert_eq!(source.len(), 1);
}

#[test]
fn test_open_empty_directory() {
    let (_dir, location) = source_dir(&[]);
    let source = FileSource::open(location).unwrap();
    assert!(source.is_empty());
    assert!(source.first().is_none());
    assert!(source.pending_after(None).unwrap().is_empty());
}

#[test]
fn test_open_rejects_duplicate_versions() {
    let (_dir, location) = source_dir(&[
        ("1_users.up.sql", "SELECT 1;"),
        ("1_accounts.up.sql", "SELECT 1;"),
    ]);
    let err = FileSource::open(location).unwrap_err();
    match err {
        CoreError::DuplicateMigration {
            version,
            direction,
            first,
            second,
        } => {
            assert_eq!(version, 1);
            assert_eq!(direction, Direction::Up);
            assert_eq!(first, "1_accounts.up.sql");
            assert_eq!(second, "1_users.up.sql");
        }
        other => panic!("expected DuplicateMigration, got {other:?}"),
    }
}

#[test]
fn test_open_accepts_down_only_version() {
    let (_dir, location) = source_dir(&[
        ("1_users.up.sql", "SELECT 1;"),
        ("2_cleanup.down.sql", "SELECT 2;"),
    ]);
    let source = FileSource::open(location).unwrap();
    let m = source.get(2).unwrap();
    assert!(m.up.is_none());
    assert_eq!(m.up_sql(), "");
    assert_eq!(m.title, "cleanup");
}

#[test]
fn test_next() {
    let (_dir, location) = source_dir(&[
        ("1_a.up.sql", ""),
        ("5_b.up.sql", ""),
        ("9_c.up.sql", ""),
    ]);
    let source = FileSource::open(location).unwrap();
    assert_eq!(source.next(1).unwrap().version, 5);
    assert_eq!(source.next(6).unwrap().version, 9);
    assert!(source.next(9).is_none());
    assert!(source.contains(5));
    assert!(!source.contains(6));
}

#[test]
fn test_pending_after() {
    let (_dir, location) = source_dir(&[
        ("1_a.up.sql", ""),
        ("2_b.up.sql", ""),
        ("3_c.up.sql", ""),
    ]);
    let source = FileSource::open(location).unwrap();

    assert_eq!(versions(&source.pending_after(None).unwrap()), vec![1, 2, 3]);
    assert_eq!(versions(&source.pending_after(Some(1)).unwrap()), vec![2, 3]);
    assert!(source.pending_after(Some(3)).unwrap().is_empty());
}

#[test]
fn test_pending_after_unknown_watermark() {
    let (_dir, location) = source_dir(&[("1_a.up.sql", ""), ("3_c.up.sql", "")]);
    let source = FileSource::open(location).unwrap();

    let err = source.pending_after(Some(2)).unwrap_err();
    assert!(matches!(err, CoreError::UnknownVersion { version: 2, .. }));

    let err = source.pending_after(Some(7)).unwrap_err();
    assert!(matches!(err, CoreError::UnknownVersion { version: 7, .. }));
}
