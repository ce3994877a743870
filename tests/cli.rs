//! Integration tests for the CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a CLI command
fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_manga-layout"));
    cmd.env("LOG_LEVEL", "warn");
    cmd
}

const PAGE: &str = r#"{
    "page_index": 0,
    "width": 400,
    "height": 600,
    "panels": [
        {"bbox": [0, 0, 190, 290], "confidence": 0.8},
        {"bbox": [210, 0, 400, 290], "confidence": 0.9},
        {"bbox": [220, 10, 390, 280], "confidence": 0.4}
    ],
    "regions": [
        {"bbox": [250, 20, 290, 120], "label": "bubble",
         "ocr_words": [{"bbox": [250, 20, 290, 120], "text": "おい"}]},
        {"bbox": [20, 20, 60, 120], "label": "bubble",
         "ocr_words": [{"bbox": [20, 20, 60, 120], "text": "なに"}]}
    ]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// ============ HELP ============

#[test]
fn test_help_lists_commands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("run"));
}

// ============ PROCESS ============

#[test]
fn test_process_single_page() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "page.json", PAGE);

    let output = cli().arg("process").arg(&input).output().unwrap();
    assert!(output.status.success());

    let layout: Value = serde_json::from_slice(&output.stdout).unwrap();
    let panels = layout["panels"].as_array().unwrap();
    // Nested low-confidence panel suppressed, right panel read first
    assert_eq!(panels.len(), 2);
    assert_eq!(panels[0]["panel_id"], 1);
    assert_eq!(panels[0]["bbox"], serde_json::json!([210.0, 0.0, 400.0, 290.0]));
    assert_eq!(panels[0]["bubbles"][0]["local_id"], 1);
}

#[test]
fn test_process_array_keeps_array_shape() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "pages.json", &format!("[{}, {}]", PAGE, PAGE));

    let output = cli().arg("process").arg(&input).output().unwrap();
    assert!(output.status.success());

    let layouts: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layouts.as_array().map(Vec::len), Some(2));
}

#[test]
fn test_process_regions_without_panels_fails() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "orphan.json",
        r#"{"width": 100, "height": 100, "panels": [],
            "regions": [{"bbox": [0, 0, 10, 10], "label": "bubble"}]}"#,
    );

    cli()
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 1 pages failed"));
}

// ============ EXPORT / MERGE ============

#[test]
fn test_export_after_process() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "page.json", PAGE);
    let layout = dir.path().join("layout.json");

    cli()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&layout)
        .assert()
        .success();
    assert!(layout.exists());

    let output = cli().arg("export").arg(&layout).output().unwrap();
    assert!(output.status.success());

    let export: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        export,
        serde_json::json!({"panels": [
            {"panel_id": 1, "bubbles": [{"bubble_id": 1, "jp": "おい"}], "outside_text": []},
            {"panel_id": 2, "bubbles": [{"bubble_id": 1, "jp": "なに"}], "outside_text": []}
        ]})
    );
}

#[test]
fn test_merge_malformed_translation_marks_missing() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "page.json", PAGE);
    let layout = dir.path().join("layout.json");
    let translation = write(&dir, "translation.json", "not json at all");

    cli()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&layout)
        .assert()
        .success();

    let output = cli()
        .arg("merge")
        .arg(&layout)
        .arg(&translation)
        .output()
        .unwrap();
    assert!(output.status.success());

    let merged: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(merged["panels"][0]["bubbles"][0]["en"], "<missing>");
    assert_eq!(merged["panels"][1]["bubbles"][0]["en"], "<missing>");
    assert_eq!(merged["panels"][0]["bubbles"][0]["jp"], "おい");
}

// ============ RUN ============

#[test]
fn test_run_with_partial_translation() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "page.json", PAGE);
    let translation = write(
        &dir,
        "translation.json",
        r#"{"panels": [{"panel_id": 1, "bubbles": [{"bubble_id": 1, "jp": "おい", "en": "Hey"}]}]}"#,
    );
    let merged_path = dir.path().join("merged.json");

    cli()
        .arg("run")
        .arg(&input)
        .arg("--translation")
        .arg(&translation)
        .arg("-o")
        .arg(&merged_path)
        .arg("--metrics")
        .assert()
        .success()
        .stderr(predicate::str::contains("translations_missing"));

    let merged: Value = serde_json::from_str(&fs::read_to_string(&merged_path).unwrap()).unwrap();
    assert_eq!(merged["panels"][0]["bubbles"][0]["en"], "Hey");
    assert_eq!(merged["panels"][1]["bubbles"][0]["en"], "<missing>");
}

#[test]
fn test_run_without_translation_prints_export() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "page.json", PAGE);

    cli()
        .arg("run")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bubble_id\": 1"))
        .stdout(predicate::str::contains("\"jp\": \"おい\""));
}

// ============ PAGE ARRAYS ============

#[test]
fn test_merge_single_element_arrays_pair_by_position() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "pages.json", &format!("[{}]", PAGE));
    let layout = dir.path().join("layouts.json");
    let translation = write(
        &dir,
        "translations.json",
        r#"[{"panels": [{"panel_id": 1, "bubbles": [{"bubble_id": 1, "en": "Hey"}]}]}]"#,
    );

    cli()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&layout)
        .assert()
        .success();

    let output = cli()
        .arg("merge")
        .arg(&layout)
        .arg(&translation)
        .output()
        .unwrap();
    assert!(output.status.success());

    let merged: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(merged.as_array().map(Vec::len), Some(1));
    assert_eq!(merged[0]["panels"][0]["bubbles"][0]["en"], "Hey");
    assert_eq!(merged[0]["panels"][1]["bubbles"][0]["en"], "<missing>");
}

#[test]
fn test_reversed_box_reports_coordinates() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "reversed.json",
        r#"{"width": 100, "height": 100, "panels": [{"bbox": [50, 0, 10, 10], "confidence": 0.9}]}"#,
    );

    cli()
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid box coordinates"));

    let array = write(
        &dir,
        "reversed_array.json",
        r#"[{"width": 100, "height": 100, "panels": [{"bbox": [50, 0, 10, 10], "confidence": 0.9}]}]"#,
    );
    cli()
        .arg("process")
        .arg(&array)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid box coordinates"));
}

#[test]
fn test_failed_page_still_writes_the_others() {
    let dir = TempDir::new().unwrap();
    let orphan = r#"{"page_index": 1, "width": 100, "height": 100, "panels": [],
        "regions": [{"bbox": [0, 0, 10, 10], "label": "bubble"}]}"#;
    let input = write(&dir, "pages.json", &format!("[{}, {}]", PAGE, orphan));
    let layout = dir.path().join("layouts.json");

    cli()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&layout)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 pages failed"));

    let layouts: Value = serde_json::from_str(&fs::read_to_string(&layout).unwrap()).unwrap();
    assert_eq!(layouts.as_array().map(Vec::len), Some(1));
    assert_eq!(layouts[0]["panels"][0]["panel_id"], 1);
}

#[test]
fn test_run_pairs_translations_with_surviving_pages() {
    let dir = TempDir::new().unwrap();
    let orphan = r#"{"page_index": 0, "width": 100, "height": 100, "panels": [],
        "regions": [{"bbox": [0, 0, 10, 10], "label": "bubble"}]}"#;
    let input = write(&dir, "pages.json", &format!("[{}, {}]", orphan, PAGE));
    let translation = write(
        &dir,
        "translations.json",
        r#"[{"panels": []},
            {"panels": [{"panel_id": 2, "bubbles": [{"bubble_id": 1, "en": "What?"}]}]}]"#,
    );

    let output = cli()
        .arg("run")
        .arg(&input)
        .arg("--translation")
        .arg(&translation)
        .output()
        .unwrap();
    assert!(!output.status.success());

    let merged: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(merged.as_array().map(Vec::len), Some(1));
    assert_eq!(merged[0]["panels"][1]["bubbles"][0]["en"], "What?");
    assert_eq!(merged[0]["panels"][0]["bubbles"][0]["en"], "<missing>");
}
