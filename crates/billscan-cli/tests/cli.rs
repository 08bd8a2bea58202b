use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ACME: &str = "Name: Acme Corp\nBill No: 1029\nDate: 01/02/2024\nDue Date: 15/02/2024\nItem Quantity Rate amount\nWidget 4 10 40\n";

fn billscan(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("billscan").unwrap();
    // Keep the user's real config out of the way.
    cmd.env("XDG_CONFIG_HOME", config_dir.path());
    cmd.env("HOME", config_dir.path());
    cmd
}

#[test]
fn text_command_structures_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("acme.txt");
    fs::write(&input, ACME).unwrap();

    let output = billscan(&dir).arg("text").arg(&input).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let data = &json["structured_data"];
    assert_eq!(data["vendor_info"]["name"], "Acme Corp");
    assert_eq!(data["bill_info"]["bill_number"], "1029");
    assert_eq!(data["dates"]["created_date"], "01/02/2024");
    assert_eq!(data["dates"]["due_date"], "15/02/2024");
    assert_eq!(data["items"][0]["item_name"], "Widget");
    assert_eq!(data["items"][0]["amount"], 40);
}

#[test]
fn text_command_reads_stdin() {
    let dir = TempDir::new().unwrap();
    billscan(&dir)
        .args(["text", "-", "-f", "text"])
        .write_stdin(ACME)
        .assert()
        .success()
        .stdout(predicate::str::contains("Vendor:    Acme Corp"))
        .stdout(predicate::str::contains("Bill No:   1029"));
}

#[test]
fn text_command_writes_csv_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("acme.txt");
    let out = dir.path().join("acme.csv");
    fs::write(&input, ACME).unwrap();

    billscan(&dir)
        .arg("text")
        .arg(&input)
        .args(["-f", "csv", "-o"])
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.contains("item,,,,,Widget,,4,10,40"));
}

#[test]
fn unlabeled_text_keeps_aliases() {
    let dir = TempDir::new().unwrap();
    let output = billscan(&dir)
        .args(["text", "-"])
        .write_stdin("nothing to see here\n")
        .output()
        .unwrap();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let data = &json["structured_data"];
    assert!(data["vendor_info"]["name"].is_null());
    assert!(!data["vendor_info"]["aliases"].as_array().unwrap().is_empty());
    assert_eq!(data["items"], serde_json::json!([]));
}

#[test]
fn rules_command_lists_aliases() {
    let dir = TempDir::new().unwrap();
    billscan(&dir)
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("vendor_name"))
        .stdout(predicate::str::contains("Due Date"))
        .stdout(predicate::str::contains("unit price"));
}

#[test]
fn process_rejects_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.docx");
    fs::write(&input, b"PK\x03\x04").unwrap();

    billscan(&dir)
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported document format"));
}

#[test]
fn process_reports_exhaustion_for_unreadable_image() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("scan.png");
    fs::write(&input, b"\x89PNG\r\n\x1a\ntruncated").unwrap();

    billscan(&dir)
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("image_recognize"));
}

#[test]
fn process_missing_file() {
    let dir = TempDir::new().unwrap();
    billscan(&dir)
        .args(["process", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn config_init_get_set_roundtrip() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("billscan.json");
    let config_arg = config.to_str().unwrap();

    billscan(&dir).args(["-c", config_arg, "config", "init"]).assert().success();
    assert!(config.exists());

    billscan(&dir)
        .args(["-c", config_arg, "config", "get", "acquisition.render_dpi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("300"));

    billscan(&dir)
        .args(["-c", config_arg, "config", "set", "acquisition.max_pages", "3"])
        .assert()
        .success();

    billscan(&dir)
        .args(["-c", config_arg, "config", "get", "acquisition.max_pages"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));
}

#[test]
fn config_set_rejects_invalid_value() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("billscan.json");
    let config_arg = config.to_str().unwrap();

    billscan(&dir).args(["-c", config_arg, "config", "init"]).assert().success();
    billscan(&dir)
        .args(["-c", config_arg, "config", "set", "acquisition.render_dpi", "high"])
        .assert()
        .failure();
}

#[test]
fn custom_field_rule_from_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("billscan.json");
    fs::write(
        &config,
        r#"{"extraction": {"fields": [
            {"name": "bill_number", "aliases": ["Ref"], "pattern": "identifier"},
            {"name": "po_number", "aliases": ["PO"], "pattern": "identifier"}
        ]}}"#,
    )
    .unwrap();

    let output = billscan(&dir)
        .args(["-c", config.to_str().unwrap(), "text", "-"])
        .write_stdin("Ref: A-77\nPO: 5512\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let data = &json["structured_data"];
    assert_eq!(data["bill_info"]["bill_number"], "A-77");
    assert_eq!(data["additional_fields"]["po_number"]["value"], "5512");
    assert!(data["vendor_info"]["name"].is_null());
}

#[test]
fn batch_continues_past_failures() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.png"), b"not an image").unwrap();
    fs::write(dir.path().join("b.jpg"), b"not an image either").unwrap();
    let pattern = format!("{}/*", dir.path().display());

    billscan(&dir)
        .args(["batch", &pattern, "--continue-on-error", "-j", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("2 failed"));
}

#[test]
fn batch_stops_on_first_failure_by_default() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.png"), b"not an image").unwrap();
    let pattern = format!("{}/*.png", dir.path().display());

    billscan(&dir).args(["batch", &pattern]).assert().failure();
}
