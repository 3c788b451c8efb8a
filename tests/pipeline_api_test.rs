//! Integration tests for the provisioning pipeline through the public API.

use sqm_provision::config::{finalize, ProvisioningConfig};
use sqm_provision::host::{FileChange, HostRoot};
use sqm_provision::render::{all_artifacts, render_service_unit, GPSD_DEFAULTS_PATH};
use sqm_provision::runner::{Pipeline, PipelineOutcome, PipelineState};
use sqm_provision::shell::{DryRunRunner, RecordingRunner};
use sqm_provision::stages::{Activation, Effect, StageContext, StageName};
use sqm_provision::state::RunReport;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn default_config() -> ProvisioningConfig {
    finalize(&ProvisioningConfig::default()).unwrap()
}

fn run(config: &ProvisioningConfig, root: &HostRoot, runner: &mut RecordingRunner) -> PipelineOutcome {
    let mut ctx = StageContext::new(config, root, runner);
    Pipeline::default().run(&mut ctx)
}

/// Every file under `dir` with its content.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, String> {
    let mut files = BTreeMap::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.insert(path.clone(), fs::read_to_string(&path).unwrap());
            }
        }
    }
    files
}

#[test]
fn second_run_leaves_host_identical() {
    let temp = TempDir::new().unwrap();
    let root = HostRoot::new(temp.path());
    let config = default_config();

    let first = run(&config, &root, &mut RecordingRunner::new());
    assert!(first.success());
    let after_first = snapshot(temp.path());

    let second = run(&config, &root, &mut RecordingRunner::new());
    assert!(second.success());
    assert_eq!(snapshot(temp.path()), after_first);

    for effect in second.effects() {
        if let Effect::FileWritten { change, .. } = effect {
            assert_eq!(*change, FileChange::Unchanged);
        }
    }
}

#[test]
fn existing_environment_is_not_recreated() {
    let temp = TempDir::new().unwrap();
    let root = HostRoot::new(temp.path());
    let config = default_config();
    fs::create_dir_all(root.resolve(&config.venv_dir)).unwrap();

    let mut runner = RecordingRunner::new();
    run(&config, &root, &mut runner);

    assert!(!runner.ran("-m venv"));
    assert!(runner.ran("-m pip install --upgrade pip"));
}

#[test]
fn missing_requirements_installs_nothing() {
    let temp = TempDir::new().unwrap();
    let root = HostRoot::new(temp.path());
    let config = default_config();

    let mut runner = RecordingRunner::new();
    let outcome = run(&config, &root, &mut runner);

    assert!(outcome.success());
    assert!(!runner.ran("pip install -r"));
}

#[test]
fn failed_install_prevents_gps_configuration() {
    let temp = TempDir::new().unwrap();
    let root = HostRoot::new(temp.path());
    let config = default_config();

    let mut runner = RecordingRunner::new();
    runner.fail_on("apt-get install", 100);
    let outcome = run(&config, &root, &mut runner);

    assert_eq!(outcome.failure.as_ref().unwrap().stage, StageName::Packages);
    assert!(!root.exists(Path::new(GPSD_DEFAULTS_PATH)));
    assert!(!runner.ran("systemctl"));
    assert_eq!(runner.commands().len(), 2);
}

#[test]
fn unit_references_configured_paths() {
    let raw = ProvisioningConfig {
        venv_dir: PathBuf::from("/opt/sqm/env"),
        entry_point: PathBuf::from("/opt/sqm/logger.py"),
        ..Default::default()
    };
    let config = finalize(&raw).unwrap();
    let unit = render_service_unit(&config);

    assert!(unit
        .content
        .contains("ExecStart=/usr/bin/screen -dmS sqm /opt/sqm/env/bin/python /opt/sqm/logger.py"));
}

#[test]
fn all_health_checks_run_despite_failures() {
    let temp = TempDir::new().unwrap();
    let root = HostRoot::new(temp.path());
    let config = default_config();

    let mut runner = RecordingRunner::new();
    runner.fail_on("gpspipe", 124);
    runner.fail_on("chronyc", 1);
    let outcome = run(&config, &root, &mut runner);

    assert!(outcome.success());
    assert_eq!(outcome.state, PipelineState::Checked);
    assert!(runner.ran("gpspipe"));
    assert!(runner.ran("chronyc sources -v"));
    assert!(runner.ran("systemctl status sqm-logger.service --no-pager"));
}

#[test]
fn planning_after_apply_reports_unchanged() {
    let temp = TempDir::new().unwrap();
    let root = HostRoot::new(temp.path());
    let config = default_config();

    assert_eq!(all_artifacts(&config), all_artifacts(&config));
    for file in all_artifacts(&config) {
        assert_eq!(file.apply(&root).unwrap(), FileChange::Create);
    }
    for file in all_artifacts(&config) {
        assert_eq!(file.plan(&root).unwrap(), FileChange::Unchanged);
    }
}

#[test]
fn dry_run_creates_no_files() {
    let temp = TempDir::new().unwrap();
    let root_dir = temp.path().join("image");
    let root = HostRoot::new(&root_dir);
    let config = default_config();

    let mut runner = DryRunRunner::new();
    let outcome = {
        let mut ctx = StageContext::new(&config, &root, &mut runner);
        Pipeline::default().run(&mut ctx)
    };

    assert!(outcome.success());
    assert!(!root_dir.exists());
    assert!(runner
        .commands()
        .iter()
        .any(|c| c.display() == "systemctl daemon-reload"));
}

#[test]
fn failure_is_named_and_reported() {
    let temp = TempDir::new().unwrap();
    let root = HostRoot::new(temp.path());
    let config = default_config();

    let mut runner = RecordingRunner::new();
    runner.fail_on("systemctl restart chrony", 1);
    let outcome = run(&config, &root, &mut runner);

    let failure = outcome.failure.as_ref().unwrap();
    assert_eq!(failure.stage, StageName::Timesync);
    assert_eq!(
        outcome.not_attempted,
        vec![StageName::Service, StageName::Health]
    );
    assert!(outcome.report(StageName::Gpsd).is_some());

    let report = RunReport::from_outcome(&outcome);
    report.save(&root).unwrap();
    let loaded = RunReport::load(&root).unwrap().unwrap();
    assert_eq!(loaded.failed_stage, Some(StageName::Timesync));
    assert_eq!(loaded.stages.len(), 4);
    assert!(!loaded.success);
}

#[test]
fn activation_scope_ends_after_failure() {
    let temp = TempDir::new().unwrap();
    let root = HostRoot::new(temp.path());
    let config = default_config();

    let mut runner = RecordingRunner::new();
    runner.fail_on("pip install", 1);
    let mut ctx = StageContext::new(&config, &root, &mut runner);

    let outcome = Pipeline::new(&[StageName::Environment]).run(&mut ctx);
    assert!(!outcome.success());
    assert!(ctx.env().is_empty());

    {
        let venv = Activation::enter(&mut ctx, &config.venv_dir);
        assert!(venv.env().contains_key("VIRTUAL_ENV"));
    }
    assert!(ctx.env().is_empty());
}
