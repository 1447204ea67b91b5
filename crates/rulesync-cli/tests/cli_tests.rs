//! CLI tests that invoke the compiled `rulesync` binary

use std::net::TcpListener;

use assert_cmd::Command;
use predicates::prelude::*;
use rulesync_test_utils::{RuleFiles, cpu_alerts_yaml};

/// `rulesync` with a clean environment and an empty home directory.
fn rulesync(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("rulesync").unwrap();
    cmd.env("HOME", home)
        .env_remove("CORTEX_ADDRESS")
        .env_remove("CORTEX_TENANT_ID")
        .env_remove("CORTEX_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn unused_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[test]
fn help_lists_rules_actions() {
    let files = RuleFiles::new();
    rulesync(files.root())
        .args(["rules", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("load"))
        .stdout(predicate::str::contains("lint"));
}

#[test]
fn version_flag() {
    let files = RuleFiles::new();
    rulesync(files.root())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn lint_works_offline() {
    let files = RuleFiles::new();
    let path = files.write("team-a.yaml", &cpu_alerts_yaml("team-a", "cpu > 90"));

    rulesync(files.root())
        .args(["rules", "lint"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("team-a/cpu-alerts"));
}

#[test]
fn lint_rejects_duplicate_groups() {
    let files = RuleFiles::new();
    let first = files.write("a.yaml", &cpu_alerts_yaml("team-a", "cpu > 90"));
    let second = files.write("b.yaml", &cpu_alerts_yaml("team-a", "cpu > 80"));

    rulesync(files.root())
        .args(["rules", "lint"])
        .arg(&first)
        .arg(&second)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cpu-alerts"));
}

#[test]
fn missing_address_is_reported() {
    let files = RuleFiles::new();
    rulesync(files.root())
        .args(["rules", "list", "--id", "team-a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CORTEX_ADDRESS"));
}

#[test]
fn parse_error_fails_before_contacting_ruler() {
    let files = RuleFiles::new();
    let path = files.write("bad.yaml", "groups:\n  - name: g\n    rules:\n      - expr: up\n");

    rulesync(files.root())
        .env("CORTEX_ADDRESS", format!("http://127.0.0.1:{}", unused_port()))
        .env("CORTEX_TENANT_ID", "team-a")
        .args(["rules", "load"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to parse rules files"));
}

#[test]
fn unreachable_ruler_fails_load() {
    let files = RuleFiles::new();
    let path = files.write("team-a.yaml", &cpu_alerts_yaml("team-a", "cpu > 90"));

    rulesync(files.root())
        .env("CORTEX_ADDRESS", format!("http://127.0.0.1:{}", unused_port()))
        .env("CORTEX_TENANT_ID", "team-a")
        .args(["rules", "load", "--request-timeout", "2s"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("fetch failed for team-a/cpu-alerts"))
        .stderr(predicate::str::contains("load operation unsuccessful"));
}

#[test]
fn config_file_supplies_connection() {
    let files = RuleFiles::new();
    let config = files.write(
        "rulesync.toml",
        &format!(
            "address = \"http://127.0.0.1:{}\"\ntenant_id = \"team-a\"\ntimeout = \"2s\"\n",
            unused_port()
        ),
    );

    // Connection settings resolve, so the failure is the transport one
    rulesync(files.root())
        .args(["rules", "get", "team-a", "cpu-alerts", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to contact the rule store"));
}
