use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_autobook_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("autobook")
}

/// A command with none of autobook's variables inherited from the caller
fn clean_command() -> Command {
    let mut cmd = Command::new(get_autobook_bin());
    for var in [
        "OP_ITEM_NAME",
        "OP_VAULT",
        "OFFICE_ID",
        "FLOOR_ID",
        "PREFERRED_DESK",
        "DESKBIRD_URL",
        "CHROME_PATH",
        "AUTOBOOK_PROFILE_DIR",
        "SCREENSHOT_DIR",
        "LOG_LEVEL",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_plan_json_from_flags() {
    let mut cmd = clean_command();
    cmd.args(["plan", "--office-id", "14205", "--floor-id", "41424", "--format", "json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"office_id\": \"14205\""))
        .stdout(predicate::str::contains("\"floor_id\": \"41424\""))
        .stdout(predicate::str::contains("\"start_ms\""))
        .stdout(predicate::str::contains(
            "https://app.deskbird.com/office/14205/bookings/dashboard?floorId=41424&viewType=card&areaType=all&startTime=",
        ))
        .stdout(predicate::str::contains("isFullDay=true"));
}

#[test]
fn test_plan_reads_environment() {
    let mut cmd = clean_command();
    cmd.env("OFFICE_ID", "7")
        .env("FLOOR_ID", "8")
        .env("PREFERRED_DESK", "B")
        .env("DESKBIRD_URL", "https://deskbird.example.com")
        .args(["plan", "--format", "json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"preferred_desk\": \"5.09 B\""))
        .stdout(predicate::str::contains(
            "https://deskbird.example.com/office/7/bookings/dashboard?floorId=8",
        ))
        .stdout(predicate::str::contains("https://deskbird.example.com/login/check-in"));
}

#[test]
fn test_plan_pretty() {
    let mut cmd = clean_command();
    cmd.args(["plan", "--office-id", "1", "--floor-id", "2"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Booking plan"))
        .stdout(predicate::str::contains("first available"));
}

#[test]
fn test_plan_without_office_fails() {
    let mut cmd = clean_command();
    cmd.args(["plan", "--floor-id", "2"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("OFFICE_ID is not set"));
}

#[test]
fn test_book_without_office_fails_before_browser() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = clean_command();
    cmd.args(["book", "--floor-id", "2", "--chrome-path", "/nonexistent/chromium"])
        .arg("--screenshot-dir")
        .arg(temp_dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("OFFICE_ID is not set"))
        .stderr(predicate::str::contains("Chrome").not());
}

#[test]
fn test_invalid_base_url_fails() {
    let mut cmd = clean_command();
    cmd.args(["plan", "--office-id", "1", "--floor-id", "2", "--base-url", "not a url"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DESKBIRD_URL"));
}

#[test]
fn test_book_help_lists_environment() {
    let mut cmd = clean_command();
    cmd.args(["book", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ENVIRONMENT:"))
        .stdout(predicate::str::contains("OFFICE_ID"))
        .stdout(predicate::str::contains("AUTOBOOK_PROFILE_DIR"))
        .stdout(predicate::str::contains("--headed"));
}
