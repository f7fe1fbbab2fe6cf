// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Directory-level tests: output modes, traversal and failure isolation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use ctxweave::config::{default_config, load_config, CliOptions};
use ctxweave::orchestrator::{run, Emitter, RunSettings};
use ctxweave::transform::TransformKind;

const SERVICE: &str = "package svc\n\nimport \"context\"\n\nfunc Get(id string) error { return nil }\n";
const SERVICE_WITH_CONTEXT: &str =
    "package svc\n\nimport \"context\"\n\nfunc Get(ctx context.Context, id string) error { return nil }\n";

type Captured = Arc<Mutex<Vec<(PathBuf, String)>>>;

fn capture() -> (Emitter, Captured) {
    let seen: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let emitter: Emitter = Arc::new(move |path: &Path, text: &str| {
        sink.lock().unwrap().push((path.to_path_buf(), text.to_string()));
    });
    (emitter, seen)
}

/// Sorted relative paths and contents of every file below `root`.
fn snapshot(root: &Path) -> Vec<(PathBuf, String)> {
    let mut files: Vec<(PathBuf, String)> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, fs::read_to_string(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}

fn tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("service.go"), SERVICE).unwrap();
    fs::write(temp.path().join("notes.txt"), "not go\n").unwrap();
    fs::create_dir(temp.path().join("nested")).unwrap();
    fs::write(temp.path().join("nested").join("inner.go"), SERVICE).unwrap();
    temp
}

#[tokio::test]
async fn test_derived_files_are_written_next_to_inputs() {
    let temp = tree();
    let config = default_config();
    let (emitter, seen) = capture();

    let summary = run(
        vec![temp.path().to_path_buf()],
        RunSettings::from_config(&config),
        TransformKind::Context.build(&config),
        emitter,
    )
    .await;

    assert_eq!(summary.written, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        fs::read_to_string(temp.path().join("gen_service.go")).unwrap(),
        SERVICE_WITH_CONTEXT
    );
    assert_eq!(fs::read_to_string(temp.path().join("service.go")).unwrap(), SERVICE);
    assert!(!temp.path().join("nested").join("gen_inner.go").exists());
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rewrite_in_place_recursively() {
    let temp = tree();
    let mut config = default_config();
    config.rewrite = true;
    config.recursive = true;
    let (emitter, _) = capture();

    let summary = run(
        vec![temp.path().to_path_buf()],
        RunSettings::from_config(&config),
        TransformKind::Context.build(&config),
        emitter,
    )
    .await;

    assert_eq!(summary.written, 2);
    assert_eq!(
        fs::read_to_string(temp.path().join("service.go")).unwrap(),
        SERVICE_WITH_CONTEXT
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("nested").join("inner.go")).unwrap(),
        SERVICE_WITH_CONTEXT
    );
    assert!(!temp.path().join("gen_service.go").exists());
}

#[tokio::test]
async fn test_dry_run_never_touches_storage() {
    let temp = tree();
    let before = snapshot(temp.path());

    let mut config = default_config();
    config.rewrite = true;
    config.dry_run = true;
    config.recursive = true;
    let (emitter, seen) = capture();

    let summary = run(
        vec![temp.path().to_path_buf()],
        RunSettings::from_config(&config),
        TransformKind::Context.build(&config),
        emitter,
    )
    .await;

    assert_eq!(summary.emitted, 2);
    assert_eq!(summary.written, 0);
    assert_eq!(snapshot(temp.path()), before);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(_, text)| text == SERVICE_WITH_CONTEXT));
}

#[tokio::test]
async fn test_normalized_file_is_still_emitted_and_written() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("service.go"), SERVICE_WITH_CONTEXT).unwrap();

    let mut config = default_config();
    config.dry_run = true;
    let (emitter, seen) = capture();
    let summary = run(
        vec![temp.path().to_path_buf()],
        RunSettings::from_config(&config),
        TransformKind::Context.build(&config),
        emitter,
    )
    .await;

    assert_eq!(summary.emitted, 1);
    {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, SERVICE_WITH_CONTEXT);
    }
    assert!(!temp.path().join("gen_service.go").exists());

    let config = default_config();
    let (emitter, seen) = capture();
    let summary = run(
        vec![temp.path().to_path_buf()],
        RunSettings::from_config(&config),
        TransformKind::Context.build(&config),
        emitter,
    )
    .await;

    assert_eq!(summary.written, 1);
    assert_eq!(
        fs::read_to_string(temp.path().join("gen_service.go")).unwrap(),
        SERVICE_WITH_CONTEXT
    );
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failures_do_not_stop_other_roots() {
    let first = tree();
    let second = TempDir::new().unwrap();
    fs::write(second.path().join("plain.go"), "package plain\n\nfunc Run() {}\n").unwrap();
    fs::write(second.path().join("service.go"), SERVICE).unwrap();

    let mut config = default_config();
    config.rewrite = true;
    let (emitter, _) = capture();

    let summary = run(
        vec![
            first.path().to_path_buf(),
            PathBuf::from("/nonexistent/ctxweave"),
            second.path().to_path_buf(),
        ],
        RunSettings::from_config(&config),
        TransformKind::Trace.build(&config),
        emitter,
    )
    .await;

    // notes.txt is not Go, plain.go has no import block
    assert_eq!(summary.failed_roots, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.written, 2);
    assert_eq!(
        fs::read_to_string(second.path().join("service.go")).unwrap(),
        SERVICE
    );
    assert_eq!(
        fs::read_to_string(second.path().join("plain.go")).unwrap(),
        "package plain\n\nfunc Run() {}\n"
    );
}

#[tokio::test]
async fn test_exclude_and_prefix_from_workspace_config() {
    let temp = tree();
    fs::write(temp.path().join("service_test.go"), SERVICE).unwrap();
    fs::write(
        temp.path().join(".ctxweave.json"),
        r#"{"outputPrefix": "ctx_", "recursive": true, "exclude": ["*_test.go", "*.txt", ".ctxweave.json"]}"#,
    )
    .unwrap();

    let config = load_config(temp.path(), CliOptions::default()).unwrap();
    let (emitter, _) = capture();

    let summary = run(
        vec![temp.path().to_path_buf()],
        RunSettings::from_config(&config),
        TransformKind::Context.build(&config),
        emitter,
    )
    .await;

    assert_eq!(summary.written, 2);
    assert_eq!(summary.failed, 0);
    assert!(temp.path().join("ctx_service.go").exists());
    assert!(temp.path().join("nested").join("ctx_inner.go").exists());
    assert!(!temp.path().join("ctx_service_test.go").exists());
}
