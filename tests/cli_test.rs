//! Integration tests for the sqm-provision binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A working directory plus an empty host root beneath it.
fn setup(config: Option<&str>) -> TempDir {
    let temp = TempDir::new().unwrap();
    if let Some(config) = config {
        fs::write(temp.path().join("sqm-provision.yml"), config).unwrap();
    }
    temp
}

fn sqm(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("sqm-provision"));
    cmd.current_dir(temp.path())
        .env_remove("SQM_PROVISION_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(temp.path().join("root"));
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("sqm-provision"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Provision a single-board computer"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("sqm-provision"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn render_unit_with_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp)
        .args(["render", "unit"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ExecStart=/usr/bin/screen -dmS sqm /home/pi/sqm/venv/bin/python /home/pi/sqm/main.py",
        ))
        .stdout(predicate::str::contains("Type=oneshot"));
    Ok(())
}

#[test]
fn render_gpsd_uses_configured_device() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(Some("gps_device: /dev/ttyUSB1\ngpsd_options: \"-n -b\"\n"));
    sqm(&temp)
        .args(["render", "gpsd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DEVICES=\"/dev/ttyUSB1\""))
        .stdout(predicate::str::contains("GPSD_OPTIONS=\"-n -b\""));
    Ok(())
}

#[test]
fn render_chrony_refclock() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp)
        .args(["render", "chrony"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "refclock SHM 0 refid GPS precision 1e-1 offset 0.0 poll 3 delay 0.2",
        ));
    Ok(())
}

#[test]
fn render_rejects_unknown_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp).args(["render", "fstab"]).assert().failure();
    Ok(())
}

#[test]
fn config_json_is_resolved() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(Some("user: astro\n"));
    let output = sqm(&temp).args(["config", "--json"]).output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["venv_dir"], "/home/astro/sqm/venv");
    assert_eq!(json["service_name"], "sqm-logger");
    Ok(())
}

#[test]
fn config_yaml_names_its_source() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(Some("session_name: night\n"));
    sqm(&temp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("sqm-provision.yml"))
        .stdout(predicate::str::contains("session_name: night"));
    Ok(())
}

#[test]
fn invalid_yaml_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(Some("packages: [unclosed\n"));
    sqm(&temp)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}

#[test]
fn invalid_values_fail_validation() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(Some("service_name: \"my logger\"\n"));
    sqm(&temp)
        .args(["render", "unit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
    Ok(())
}

#[test]
fn explicit_config_must_exist() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp)
        .args(["--config", "missing.yml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn plan_lists_changes_without_writing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("+ /etc/default/gpsd (create)"))
        .stdout(predicate::str::contains("$ apt-get update"))
        .stdout(predicate::str::contains(
            "$ systemctl enable --now sqm-logger.service",
        ));
    assert!(!temp.path().join("root").exists());
    Ok(())
}

#[test]
fn dry_run_changes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp)
        .args(["run", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete"));
    assert!(!temp.path().join("root").exists());
    Ok(())
}

#[test]
fn real_run_refuses_alternate_root() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp)
        .args(["run", "--allow-unprivileged"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("use --dry-run"));
    assert!(!temp.path().join("root").exists());
    Ok(())
}

#[test]
fn dry_run_rejects_unknown_stage() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp)
        .args(["run", "--dry-run", "--skip", "ntp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown stage: ntp"));
    Ok(())
}

#[test]
fn last_without_runs() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp)
        .arg("last")
        .assert()
        .success()
        .stdout(predicate::str::contains("No runs recorded"));
    Ok(())
}

#[test]
fn completions_for_bash() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup(None);
    sqm(&temp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sqm-provision"));
    Ok(())
}
