//! Path utilities for catalog files used in tests.
//!
//! Catalog snapshots are loaded from disk in production, so tests write their
//! YAML into temporary files and directories that disappear on drop.

use std::fs;
use std::path::PathBuf;

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("coverage_catalog_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Writes `contents` to `catalog.yaml` inside a fresh temporary directory.
///
/// # Returns
///
/// The directory guard (keep it alive for the duration of the test) and the
/// path of the written file.
pub fn write_temp_catalog(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = temp_test_dir();
    let path = dir.path().join("catalog.yaml");
    fs::write(&path, contents).expect("Failed to write temporary catalog");
    (dir, path)
}

/// Writes each `(file name, contents)` pair into one temporary directory.
///
/// Used to exercise loading a catalog split over several files.
pub fn write_temp_catalog_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = temp_test_dir();
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).expect("Failed to write temporary catalog");
    }
    dir
}
