use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

use super::sample_dir;

// 测试帮助信息
#[test]
fn test_help_lists_modes() {
    let mut cmd = Command::cargo_bin("ptsbot-config").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--validate"))
        .stdout(predicate::str::contains("--iut-presets"));
}

// 校验示例配置
#[test]
fn test_validate_sample() {
    let mut cmd = Command::cargo_bin("ptsbot-config").unwrap();
    cmd.arg("--validate")
        .arg("--no-path-check")
        .arg("-c")
        .arg(sample_dir().join("bot_projects.sample.toml"))
        .env("RUST_LOG", "debug")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 projects OK"));
}

#[test]
fn test_list_prints_markdown_table() {
    let mut cmd = Command::cargo_bin("ptsbot-config").unwrap();
    cmd.arg("--list")
        .arg("--no-path-check")
        .arg("-c")
        .arg(sample_dir().join("bot_projects.sample.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("| 0 | nrf_v160 | zephyr | nrf52 | nrf-v160 |"))
        .stdout(predicate::str::contains("monday 10:00, friday 22:00"));
}

#[test]
fn test_dump_redacts_secrets() {
    let mut cmd = Command::cargo_bin("ptsbot-config").unwrap();
    cmd.arg("--dump")
        .arg("--format")
        .arg("json")
        .arg("--no-path-check")
        .arg("-c")
        .arg(sample_dir().join("bot_projects.sample.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("hunter2").not());

    let mut cmd = Command::cargo_bin("ptsbot-config").unwrap();
    cmd.arg("--dump")
        .arg("--show-secrets")
        .arg("--no-path-check")
        .arg("-c")
        .arg(sample_dir().join("bot_projects.sample.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2"));
}

// 缺字段时报告记录下标和字段路径
#[test]
fn test_missing_field_fails_with_record_index() {
    let dir = tempdir().unwrap();
    let sample = fs::read_to_string(sample_dir().join("bot_projects.sample.toml")).unwrap();
    fs::write(dir.path().join("bot.toml"), sample.replace("board = \"nrf52\"\n", "")).unwrap();

    let mut cmd = Command::cargo_bin("ptsbot-config").unwrap();
    cmd.arg("--validate")
        .arg("--no-path-check")
        .arg("--iut-presets")
        .arg(sample_dir().join("iut_presets.toml"))
        .arg("-c")
        .arg(dir.path().join("bot.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("record #0 (nrf_v160)"))
        .stderr(predicate::str::contains("auto_pts.board"));
}

#[test]
fn test_lenient_validate_still_fails_on_rejections() {
    let dir = tempdir().unwrap();
    let sample = fs::read_to_string(sample_dir().join("bot_projects.sample.toml")).unwrap();
    fs::write(dir.path().join("bot.toml"), sample.replace("iut_config = \"mesh\"", "iut_config = \"audio\"")).unwrap();

    let mut cmd = Command::cargo_bin("ptsbot-config").unwrap();
    cmd.arg("--lenient")
        .arg("--no-path-check")
        .arg("--iut-presets")
        .arg(sample_dir().join("iut_presets.toml"))
        .arg("-c")
        .arg(dir.path().join("bot.toml"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown iut_config preset `audio`"));
}

#[test]
fn test_missing_document() {
    let mut cmd = Command::cargo_bin("ptsbot-config").unwrap();
    cmd.arg("-c")
        .arg("/nonexistent/bot_projects.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
