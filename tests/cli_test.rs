// tests/cli_test.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{TempDir, tempdir};

/// 将 HOME 指向临时目录，避免读写真实的用户配置
fn main_command(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env("HOME", home.path())
        .env_remove("ACCESS_TOKEN")
        .env_remove("LEARNCTL_API_URL");
    cmd
}

fn write_config(home: &TempDir, body: serde_json::Value) {
    let dir = home.path().join(".learnctl");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.json"), body.to_string()).unwrap();
}

#[test]
fn test_help_lists_subcommands() {
    let home = tempdir().unwrap();
    main_command(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("progress"))
        .stdout(predicate::str::contains("certificate"))
        .stdout(predicate::str::contains("study"));
}

#[test]
fn test_missing_subcommand_shows_usage() {
    let home = tempdir().unwrap();
    main_command(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: learnctl"));
}

#[test]
fn test_token_help_needs_no_network() {
    let home = tempdir().unwrap();
    main_command(&home)
        .arg("token-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("localStorage.getItem"));
}

#[test]
fn test_quiz_requires_lesson_id() {
    let home = tempdir().unwrap();
    main_command(&home)
        .args(["quiz", "rust-basics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<LESSON_ID>"));
}

#[test]
fn test_logout_clears_saved_token() {
    let home = tempdir().unwrap();
    write_config(
        &home,
        serde_json::json!({ "accesstoken": "saved", "api_base_url": "http://127.0.0.1:9/api/v1" }),
    );

    main_command(&home).arg("logout").assert().success();

    let content = fs::read_to_string(home.path().join(".learnctl").join("config.json")).unwrap();
    assert!(!content.contains("saved"));
    assert!(content.contains("http://127.0.0.1:9/api/v1"));
}

#[test]
fn test_progress_without_token_fails() {
    let home = tempdir().unwrap();
    main_command(&home)
        .args(["progress", "rust-basics", "--api-url", "http://127.0.0.1:9/api/v1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("login"));
}

#[test]
fn test_progress_against_unreachable_server_fails() {
    let home = tempdir().unwrap();
    write_config(
        &home,
        serde_json::json!({ "network": { "connect_timeout_secs": 1, "max_read_retries": 0 } }),
    );

    main_command(&home)
        .args(["progress", "rust-basics", "--token", "t", "--api-url", "http://127.0.0.1:9/api/v1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("程序执行出错"));
}

#[test]
fn test_creates_default_config_on_first_run() {
    let home = tempdir().unwrap();
    main_command(&home)
        .args(["progress", "rust-basics", "--api-url", "http://127.0.0.1:9/api/v1"])
        .assert()
        .failure();

    let content = fs::read_to_string(home.path().join(".learnctl").join("config.json")).unwrap();
    assert!(content.contains("api_base_url"));
}
