//! Meta-tests that verify test suite integrity
//!
//! These tests ensure that:
//! - No tests are ignored
//! - E2E test files exist
//! - Server UI assets embedded at compile time are present

use std::path::{Path, PathBuf};

fn rust_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            out.push(path);
        }
    }
}

/// Verify no tests are ignored in the workspace
///
/// Ignored tests can hide regressions. All tests must run.
#[test]
fn no_ignored_tests() {
    let mut files = Vec::new();
    for dir in ["src", "tests", "benches", "crates"] {
        rust_files(Path::new(dir), &mut files);
    }
    assert!(!files.is_empty(), "no sources found from {:?}", std::env::current_dir());

    let marker = concat!("#[", "ignore");
    let offenders: Vec<_> = files
        .iter()
        .filter(|path| {
            std::fs::read_to_string(path)
                .map(|src| src.contains(marker))
                .unwrap_or(false)
        })
        .collect();

    assert!(
        offenders.is_empty(),
        "Found ignored tests - all tests must run: {offenders:?}"
    );
}

/// Verify E2E test files exist and are not empty
#[test]
fn e2e_tests_exist() {
    let test_files = [
        "e2e_statistics.rs",
        "e2e_distribution.rs",
        "e2e_loader.rs",
        "e2e_chart.rs",
        "e2e_export.rs",
        "e2e_config.rs",
        "e2e_dashboard_state.rs",
        "e2e_recording.rs",
    ];

    for file in test_files {
        let path = format!("tests/{}", file);
        let full_path = Path::new(&path);

        assert!(
            full_path.exists(),
            "Missing E2E test file: {}. All E2E tests must be present.",
            file
        );

        let metadata = std::fs::metadata(full_path).expect("Failed to get file metadata");
        assert!(
            metadata.len() > 100,
            "E2E test file {} appears to be empty or too small ({} bytes)",
            file,
            metadata.len()
        );
    }
}

/// Verify the server's HTTP tests are present
#[test]
fn server_api_tests_exist() {
    let path = Path::new("crates/water-level-server/tests/api_tests.rs");
    assert!(path.exists(), "Missing server API tests");
}

/// Verify page styles and scripts exist
#[test]
fn ui_assets_exist() {
    let ui = Path::new("crates/water-level-server/src/ui");
    for asset in [
        "styles/base.css",
        "styles/dashboard.css",
        "styles/analysis.css",
        "styles/settings.css",
        "scripts/dashboard.js",
        "scripts/analysis.js",
        "scripts/settings.js",
        "manifest.json",
    ] {
        let path = ui.join(asset);
        assert!(path.exists(), "Missing UI asset: {}", path.display());
    }
}
