use assert_cmd::Command;
use predicates::prelude::*;
use renosheet::workbook::XlsxStore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp HOME with a GC/PLUMBING tracker workbook and a candidate task file
fn setup_test_env() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let book_path = temp_dir.path().join("tracker.xlsx");
    let tasks_path = temp_dir.path().join("tasks.json");

    let mut book = umya_spreadsheet::new_file();
    let gc = book.new_sheet("GC").unwrap();
    gc.get_cell_mut("A1").set_value("TASK");
    gc.get_cell_mut("B1").set_value("BUDGET");
    gc.get_cell_mut("C1").set_value("PROPOSED");
    gc.get_cell_mut("D1").set_value("LEAD");
    gc.get_cell_mut("A2").set_value("Paint hallway");
    gc.get_cell_mut("B2").set_value("0");
    gc.get_cell_mut("D2").set_value("Unknown");
    let plumbing = book.new_sheet("PLUMBING").unwrap();
    plumbing.get_cell_mut("A1").set_value("ITEM");
    plumbing.get_cell_mut("B1").set_value("PROPOSAL");
    umya_spreadsheet::writer::xlsx::write(&book, &book_path).unwrap();

    fs::write(
        &tasks_path,
        r#"{
  "Paint hallway": {
    "CATEGORY": "GC",
    "PROPOSED": "two coats, 500 for the work",
    "COMMENT": "managed by Jane Smith"
  },
  "Replace kitchen sink": {
    "CATEGORY": "Plumbing",
    "PROPOSED": "undermount sink"
  },
  "Install heat pump": {"CATEGORY": "HVAC"}
}"#,
    )
    .unwrap();

    (temp_dir, book_path, tasks_path)
}

fn get_renosheet_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("renosheet").unwrap();
    cmd.env("HOME", home)
        .env_remove("RENOSHEET_CONFIG")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn cell(path: &Path, sheet: &str, row: usize, col: usize) -> String {
    let (_store, workbook) = XlsxStore::open(path).unwrap();
    workbook.sheet(sheet).unwrap().cell(row, col).to_string()
}

#[test]
fn test_apply_updates_and_appends() {
    let (temp_dir, book, tasks) = setup_test_env();

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("GC: "))
        .stdout(predicate::str::contains("Dropped 1 task(s) with no matching sheet: Install heat pump"))
        .stdout(predicate::str::contains("updated:"));

    assert_eq!(cell(&book, "GC", 1, 1), "500");
    assert_eq!(cell(&book, "GC", 1, 2), "two coats, 500 for the work");
    assert_eq!(cell(&book, "GC", 1, 3), "Jane Smith");
    assert_eq!(cell(&book, "PLUMBING", 1, 0), "Replace kitchen sink");
    assert_eq!(cell(&book, "PLUMBING", 1, 1), "undermount sink");
}

#[test]
fn test_apply_no_refine_keeps_given_values() {
    let (temp_dir, book, tasks) = setup_test_env();

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap(), "--no-refine"])
        .assert()
        .success();

    assert_eq!(cell(&book, "GC", 1, 1), "0");
    assert_eq!(cell(&book, "GC", 1, 3), "Unknown");
}

#[test]
fn test_apply_dry_run_leaves_file_untouched() {
    let (temp_dir, book, tasks) = setup_test_env();
    let before = fs::read(&book).unwrap();

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap(), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(fs::read(&book).unwrap(), before);
}

#[test]
fn test_apply_json_report() {
    let (temp_dir, book, tasks) = setup_test_env();

    let output = get_renosheet_cmd(temp_dir.path())
        .args(["apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["saved"], true);
    assert_eq!(report["dropped"][0], "Install heat pump");
    let sheets = report["sheets"].as_array().unwrap();
    let plumbing = sheets.iter().find(|s| s["sheet"] == "PLUMBING").unwrap();
    assert_eq!(plumbing["status"], "processed");
    assert_eq!(plumbing["appended"][0]["task"], "Replace kitchen sink");
    let default_sheet = sheets.iter().find(|s| s["sheet"] == "Sheet1").unwrap();
    assert_eq!(default_sheet["status"], "unrecognized_sheet");
}

#[test]
fn test_apply_backup() {
    let (temp_dir, book, tasks) = setup_test_env();
    let original = fs::read(&book).unwrap();

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap(), "--backup"])
        .assert()
        .success();

    let backups: Vec<PathBuf> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().ends_with(".bak.xlsx"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read(&backups[0]).unwrap(), original);
    assert_eq!(cell(&book, "GC", 1, 1), "500");
}

#[test]
fn test_apply_malformed_tasks_changes_nothing() {
    let (temp_dir, book, tasks) = setup_test_env();
    fs::write(&tasks, "this is not json").unwrap();

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 cell(s), 0 new row(s)"));

    assert_eq!(cell(&book, "GC", 1, 1), "0");
}

#[test]
fn test_apply_layout_and_threshold_flags() {
    let (temp_dir, book, tasks) = setup_test_env();

    // nothing can score 100 against a different description
    get_renosheet_cmd(temp_dir.path())
        .args([
            "apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap(),
            "--threshold", "100", "--layout", "schema",
        ])
        .assert()
        .success();
    assert_eq!(cell(&book, "GC", 1, 1), "500");

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap(), "--threshold", "101"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_missing_spreadsheet_is_user_error() {
    let (temp_dir, _book, tasks) = setup_test_env();

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", "missing.xlsx", "--tasks", tasks.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"))
        .stderr(predicate::str::contains("Spreadsheet not found"));
}

#[test]
fn test_missing_task_file_is_user_error() {
    let (temp_dir, book, _tasks) = setup_test_env();

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", book.to_str().unwrap(), "--tasks", "nope.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Task file not found"));
}

#[test]
fn test_corrupt_workbook_is_internal_error() {
    let (temp_dir, _book, tasks) = setup_test_env();
    let corrupt = temp_dir.path().join("corrupt.xlsx");
    fs::write(&corrupt, "not a zip archive").unwrap();

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", corrupt.to_str().unwrap(), "--tasks", tasks.to_str().unwrap()])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::starts_with("Internal error:"))
        .stderr(predicate::str::contains("Failed to open workbook"));
}

#[test]
fn test_invalid_config_is_user_error() {
    let (temp_dir, book, tasks) = setup_test_env();
    let config_dir = temp_dir.path().join(".renosheet");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("rc"), "match.threshold=140\n").unwrap();

    get_renosheet_cmd(temp_dir.path())
        .args(["apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn test_config_threshold_applies() {
    let (temp_dir, book, tasks) = setup_test_env();
    let rc = temp_dir.path().join("custom_rc");
    fs::write(&rc, "# strict\nmatch.threshold=100\n").unwrap();

    get_renosheet_cmd(temp_dir.path())
        .env("RENOSHEET_CONFIG", &rc)
        .args(["apply", book.to_str().unwrap(), "--tasks", tasks.to_str().unwrap()])
        .assert()
        .success();

    // "paint hallway" still matches itself exactly
    assert_eq!(cell(&book, "GC", 1, 1), "500");
}

#[test]
fn test_extract_unsupported_transcript() {
    let (temp_dir, _book, _tasks) = setup_test_env();
    let transcript = temp_dir.path().join("meeting.odt");
    fs::write(&transcript, "notes").unwrap();

    get_renosheet_cmd(temp_dir.path())
        .args(["extract", transcript.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unsupported transcript format: .odt"));
}

#[test]
fn test_sync_without_api_key_saves_unchanged_rows() {
    let (temp_dir, book, _tasks) = setup_test_env();
    let transcript = temp_dir.path().join("meeting.txt");
    fs::write(&transcript, "Speaker 1: the budget is 900").unwrap();

    get_renosheet_cmd(temp_dir.path())
        .args(["sync", transcript.to_str().unwrap(), book.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("No Gemini API key configured"))
        .stdout(predicate::str::contains("0 cell(s), 0 new row(s)"));

    let (_store, workbook) = XlsxStore::open(&book).unwrap();
    let gc = workbook.sheet("GC").unwrap();
    assert_eq!(gc.row_count(), 2);
    assert_eq!(gc.cell(1, 0), "Paint hallway");
    assert_eq!(gc.cell(1, 1), "0");
    assert_eq!(gc.cell(1, 3), "Unknown");
    assert_eq!(workbook.sheet("PLUMBING").unwrap().row_count(), 1);
}

#[test]
fn test_extract_requires_api_key() {
    let (temp_dir, _book, _tasks) = setup_test_env();
    let transcript = temp_dir.path().join("meeting.txt");
    fs::write(&transcript, "Speaker 1: the budget is 900").unwrap();

    get_renosheet_cmd(temp_dir.path())
        .args(["extract", transcript.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"))
        .stderr(predicate::str::contains("No Gemini API key configured"));
}

#[test]
fn test_inspect() {
    let (temp_dir, book, _tasks) = setup_test_env();

    get_renosheet_cmd(temp_dir.path())
        .args(["inspect", book.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sheet1: not a category sheet"))
        .stdout(predicate::str::contains("GC (GC): header row 1, columns BUDGET@2 PROPOSED@3 LEAD@4, 1 data row(s)"))
        .stdout(predicate::str::contains("PLUMBING (PLUMBING): header row 1, columns PROPOSAL@2, 0 data row(s)"));
}

#[test]
fn test_version() {
    let temp_dir = TempDir::new().unwrap();

    get_renosheet_cmd(temp_dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
