use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const HEADER: &str = "Invoice ID,Branch,City,Customer type,Gender,Product line,Unit price,Quantity,Tax 5%,Total,Date,Time,Payment,cogs,gross margin percentage,gross income,Rating";

/// The three-row sample: A/M/10/8, A/F/20/6, B/M/30/4.
fn write_sample(dir: &Path) -> PathBuf {
    let rows = [
        "101-01-0001,A,A,Member,M,Food and beverages,10.00,1,0.50,10.00,1/5/2019,10:00,Cash,9.50,4.76,0.50,8.0",
        "101-01-0002,A,A,Normal,F,Sports and travel,20.00,1,1.00,20.00,1/6/2019,11:00,Ewallet,19.00,4.76,1.00,6.0",
        "101-01-0003,B,B,Member,M,Food and beverages,30.00,1,1.50,30.00,2/7/2019,12:00,Cash,28.50,4.76,1.50,4.0",
    ];
    let path = dir.join("sales.csv");
    std::fs::write(&path, format!("{HEADER}\n{}\n", rows.join("\n"))).unwrap();
    path
}

fn tillview(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tillview").unwrap();
    cmd.env("HOME", home).env_remove("TILLVIEW_LOG");
    cmd
}

fn summary_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let output = tillview(home)
        .arg("summary")
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn summary_filters_by_location() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_sample(dir.path());
    let json = summary_json(dir.path(), &["--data", data.to_str().unwrap(), "--location", "A"]);
    assert_eq!(json["total_amount"]["reading"]["value"], 30.0);
    assert_eq!(json["total_amount"]["display"], "30.00 USD");
    assert_eq!(json["average_rating"]["display"], "7.00");
    let groups = json["bars"]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["location"], "A");
    assert_eq!(groups[0]["bars"].as_array().unwrap().len(), 2);
}

#[test]
fn summary_without_locations_applies_gender_only() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_sample(dir.path());
    let json = summary_json(dir.path(), &["--data", data.to_str().unwrap(), "--gender", "M"]);
    assert_eq!(json["total_amount"]["reading"]["value"], 40.0);
    assert_eq!(json["average_rating"]["display"], "6.00");
    assert_eq!(json["pie"]["slices"].as_array().unwrap().len(), 1);
}

#[test]
fn summary_for_absent_location_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_sample(dir.path());
    let json = summary_json(dir.path(), &["--data", data.to_str().unwrap(), "--location", "C"]);
    assert_eq!(json["total_amount"]["reading"]["value"], 0.0);
    assert_eq!(json["average_rating"]["reading"]["state"], "no_data");
    assert_eq!(json["average_rating"]["display"], "No data");
    assert!(json["histogram"]["bins"].as_array().unwrap().is_empty());
    assert!(json["bars"]["groups"].as_array().unwrap().is_empty());
    assert!(json["pie"]["slices"].as_array().unwrap().is_empty());
}

#[test]
fn summary_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_sample(dir.path());
    tillview(dir.path())
        .args(["summary", "--data", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("60.00 USD"))
        .stdout(predicate::str::contains("(3 transactions)"))
        .stdout(predicate::str::contains("Food and beverages"));
}

#[test]
fn missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.csv");
    tillview(dir.path())
        .args(["summary", "--data", missing.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn missing_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "Invoice ID,City,Gender,Total\n1,A,M,10\n").unwrap();
    tillview(dir.path())
        .args(["options", "--data", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required column 'Product line'"));
}

#[test]
fn oversized_bin_setting_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_sample(dir.path());
    let config = dir.path().join(".config/tillview");
    std::fs::create_dir_all(&config).unwrap();
    std::fs::write(config.join("settings.json"), r#"{"histogram_bins": 100000}"#).unwrap();
    tillview(dir.path())
        .args(["summary", "--data", data.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"))
        .stderr(predicate::str::contains("Invalid setting 'histogram_bins'"));
}

#[test]
fn no_dataset_configured() {
    let dir = tempfile::tempdir().unwrap();
    tillview(dir.path())
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No dataset configured"));
}

#[test]
fn load_remembers_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_sample(dir.path());
    tillview(dir.path())
        .args(["load", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 transactions"));
    tillview(dir.path())
        .arg("options")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 transactions, 2019-01-05 to 2019-02-07"))
        .stdout(predicate::str::contains("  all\n"));
}

#[test]
fn load_rejects_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(
        &path,
        format!("{HEADER}\n1,A,A,Member,M,Food,1,1,0,10.00,not-a-date,10:00,Cash,1,1,1,5\n"),
    )
    .unwrap();
    tillview(dir.path())
        .args(["load", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
    assert!(!dir.path().join(".config/tillview/settings.json").exists());
}

#[test]
fn demo_then_summary() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("demo.csv");
    tillview(dir.path())
        .args(["demo", "--rows", "40", "--seed", "9", "--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 40 demo transactions"));
    let json = summary_json(dir.path(), &[]);
    let total: u64 = json["pie"]["slices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 40);
}

#[test]
fn status_without_dataset() {
    let dir = tempfile::tempdir().unwrap();
    tillview(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn completions_for_bash() {
    let dir = tempfile::tempdir().unwrap();
    tillview(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tillview"));
}
