//! Unit tests for file discovery.

use std::{fs, path::PathBuf};

use bookmerge::{classify_file, BookmarkError, Config, Dialect, FileDiscovery};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Helper: a temp directory populated with copies of the given fixtures.
fn setup(fixtures: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for (fixture, target) in fixtures {
        fs::copy(fixture_path(fixture), dir.path().join(target)).unwrap();
    }
    dir
}

#[test]
fn directory_scan_classifies_by_content() {
    let dir = setup(&[
        ("anybox.json", "base.json"),
        ("firefox.html", "firefox.html"),
        ("safari.html", "safari.htm"),
        ("notes.txt", "notes.txt"),
        // Extension says JSON, content says Safari HTML.
        ("safari.html", "misnamed.json"),
    ]);
    let discovery = FileDiscovery::new(&Config::default()).unwrap();

    let report = discovery.discover(dir.path()).unwrap();

    let found: Vec<(String, Dialect)> = report
        .files
        .iter()
        .map(|f| (f.path.file_name().unwrap().to_string_lossy().into_owned(), f.dialect))
        .collect();
    assert_eq!(
        found,
        vec![
            ("base.json".to_string(), Dialect::AnyboxJson),
            ("firefox.html".to_string(), Dialect::Firefox),
            ("misnamed.json".to_string(), Dialect::Safari),
            ("safari.htm".to_string(), Dialect::Safari),
        ]
    );
    // notes.txt does not match the scan patterns, so it is not even considered.
    assert!(report.skipped.is_empty());
    assert_eq!(report.of_dialect(Dialect::Safari).count(), 2);
}

#[test]
fn unrecognized_files_are_skipped_and_scan_continues() {
    let dir = setup(&[("anybox.json", "a.json"), ("safari.html", "z.html")]);
    fs::write(dir.path().join("m.json"), r#"{"not": "bookmarks"}"#).unwrap();

    let discovery = FileDiscovery::new(&Config::default()).unwrap();
    let report = discovery.discover(dir.path()).unwrap();

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].0.ends_with("m.json"));
}

#[test]
fn scan_depth_limits_recursion() {
    let dir = setup(&[("anybox.json", "top.json")]);
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    fs::copy(fixture_path("firefox.html"), nested.join("deep.html")).unwrap();

    let shallow = FileDiscovery::new(&Config::default()).unwrap();
    assert_eq!(shallow.discover(dir.path()).unwrap().files.len(), 1);

    let config = Config {
        scan_depth: 2,
        ..Config::default()
    };
    let deep = FileDiscovery::new(&config).unwrap();
    assert_eq!(deep.discover(dir.path()).unwrap().files.len(), 2);
}

#[test]
fn custom_patterns_are_honored() {
    let dir = setup(&[("anybox.json", "export.bookmarks"), ("firefox.html", "f.html")]);
    let config = Config {
        scan_patterns: vec!["*.bookmarks".into()],
        ..Config::default()
    };

    let report = FileDiscovery::new(&config).unwrap().discover(dir.path()).unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].dialect, Dialect::AnyboxJson);
}

#[test]
fn invalid_pattern_is_an_error() {
    let config = Config {
        scan_patterns: vec!["[unclosed".into()],
        ..Config::default()
    };
    assert!(matches!(
        FileDiscovery::new(&config),
        Err(BookmarkError::Pattern(_))
    ));
}

#[test]
fn single_file_is_classified_directly() {
    let discovery = FileDiscovery::new(&Config::default()).unwrap();

    let report = discovery.discover(&fixture_path("notes.txt")).unwrap();
    assert!(report.files.is_empty());
    assert_eq!(report.skipped.len(), 1);

    let report = discovery.discover(&fixture_path("firefox.html")).unwrap();
    assert_eq!(report.files[0].dialect, Dialect::Firefox);
}

#[test]
fn missing_path_is_an_error() {
    let discovery = FileDiscovery::new(&Config::default()).unwrap();
    let err = discovery.discover(&fixture_path("does-not-exist")).unwrap_err();
    assert!(matches!(err, BookmarkError::FileNotFound { .. }));
}

#[test]
fn classify_file_returns_none_for_unknown_content() {
    assert_eq!(classify_file(&fixture_path("notes.txt")).unwrap(), None);
    assert_eq!(
        classify_file(&fixture_path("anybox.html")).unwrap(),
        Some(Dialect::AnyboxHtml)
    );
}
