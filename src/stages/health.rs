//! Post-install health checks.
//!
//! Every check runs even when an earlier one fails. Failures are recorded
//! as diagnostics and logged as warnings; this stage never aborts a run.

use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::Result;
use crate::shell::CommandSpec;

use super::{Stage, StageContext, StageName, StageReport};

/// Keys in the logger's `config.yaml` that name serial devices.
pub const SERIAL_PORT_KEYS: [&str; 2] = ["gps_serial_port", "sqm_serial_port"];

/// Reads the GPS feed, lists chrony sources, and queries the service.
pub struct HealthStage;

impl HealthStage {
    /// The diagnostic commands, in the order they run.
    pub fn commands(ctx: &StageContext<'_>) -> Vec<CommandSpec> {
        let config = ctx.config;
        vec![
            CommandSpec::new("timeout")
                .arg(config.health.gps_read_seconds.to_string())
                .args(["gpspipe", "-r", "-n"])
                .arg(config.health.gps_sentences.to_string()),
            CommandSpec::new("chronyc").args(["sources", "-v"]),
            CommandSpec::new("systemctl")
                .arg("status")
                .arg(config.unit_name())
                .arg("--no-pager"),
        ]
    }

    fn check_logger_config(ctx: &mut StageContext<'_>) {
        let path = ctx.config.logger_config_path();
        let name = format!("logger config {}", path.display());

        let content = match fs::read_to_string(ctx.root.resolve(&path)) {
            Ok(content) => content,
            Err(e) => {
                ctx.diagnostic(name, false, format!("cannot read: {}", e));
                return;
            }
        };

        let doc: Value = match serde_yaml::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                ctx.diagnostic(name, false, format!("invalid YAML: {}", e));
                return;
            }
        };

        let mut lines = Vec::new();
        let mut all_present = true;
        for key in SERIAL_PORT_KEYS {
            match doc.get(key).and_then(Value::as_str) {
                Some(port) => {
                    let present = ctx.root.exists(Path::new(port));
                    all_present &= present;
                    lines.push(format!(
                        "{}: {} ({})",
                        key,
                        port,
                        if present { "present" } else { "missing" }
                    ));
                }
                None => {
                    all_present = false;
                    lines.push(format!("{}: not set", key));
                }
            }
        }

        ctx.diagnostic(name, all_present, lines.join("\n"));
    }
}

impl Stage for HealthStage {
    fn name(&self) -> StageName {
        StageName::Health
    }

    fn apply(&self, ctx: &mut StageContext<'_>) -> Result<StageReport> {
        for spec in Self::commands(ctx) {
            ctx.diagnose(spec);
        }
        if ctx.is_dry_run() {
            ctx.skip("logger config is not inspected on a dry run");
        } else {
            Self::check_logger_config(ctx);
        }
        Ok(ctx.finish(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{finalize, ProvisioningConfig};
    use crate::host::HostRoot;
    use crate::shell::RecordingRunner;
    use crate::stages::Effect;
    use tempfile::TempDir;

    fn config() -> ProvisioningConfig {
        finalize(&ProvisioningConfig::default()).unwrap()
    }

    #[test]
    fn runs_all_checks_when_first_fails() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let config = config();
        let mut runner = RecordingRunner::new();
        runner.fail_on("gpspipe", 124);
        let mut ctx = StageContext::new(&config, &root, &mut runner);
        let report = HealthStage.apply(&mut ctx).unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "timeout 5 gpspipe -r -n 10",
                "chronyc sources -v",
                "systemctl status sqm-logger.service --no-pager",
            ]
        );
        // gpspipe and the missing logger config
        assert_eq!(report.failed_diagnostics().count(), 2);
    }

    #[test]
    fn diagnostics_capture_output() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let config = config();
        let mut runner = RecordingRunner::new();
        runner.respond("chronyc", "#* GPS 0 3 377 8 +12us");
        let mut ctx = StageContext::new(&config, &root, &mut runner);
        let report = HealthStage.apply(&mut ctx).unwrap();

        assert!(report.effects.iter().any(|e| matches!(
            e,
            Effect::Diagnostic { name, success: true, output }
                if name == "chronyc sources -v" && output.contains("GPS")
        )));
    }

    #[test]
    fn reports_serial_ports_from_logger_config() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let config = config();
        let logger_config = root.resolve(&config.logger_config_path());
        fs::create_dir_all(logger_config.parent().unwrap()).unwrap();
        fs::write(
            &logger_config,
            "gps_serial_port: /dev/ttyACM0\nsqm_serial_port: /dev/ttyUSB0\n",
        )
        .unwrap();
        fs::create_dir_all(root.resolve(Path::new("/dev"))).unwrap();
        fs::write(root.resolve(Path::new("/dev/ttyACM0")), "").unwrap();

        let mut runner = RecordingRunner::new();
        let mut ctx = StageContext::new(&config, &root, &mut runner);
        let report = HealthStage.apply(&mut ctx).unwrap();

        let output = report
            .effects
            .iter()
            .find_map(|e| match e {
                Effect::Diagnostic {
                    name,
                    success,
                    output,
                } if name.starts_with("logger config") => Some((*success, output.clone())),
                _ => None,
            })
            .unwrap();
        assert!(!output.0);
        assert!(output.1.contains("gps_serial_port: /dev/ttyACM0 (present)"));
        assert!(output.1.contains("sqm_serial_port: /dev/ttyUSB0 (missing)"));
    }

    #[test]
    fn dry_run_records_commands_only() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let config = config();
        let mut runner = crate::shell::DryRunRunner::new();
        let mut ctx = StageContext::new(&config, &root, &mut runner);
        let report = HealthStage.apply(&mut ctx).unwrap();

        assert_eq!(report.commands().count(), 3);
        assert_eq!(report.failed_diagnostics().count(), 0);
        assert!(!report
            .effects
            .iter()
            .any(|e| matches!(e, Effect::Diagnostic { .. })));
    }

    #[test]
    fn missing_program_is_a_failed_diagnostic() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let config = config();
        let mut runner = crate::shell::SystemRunner::new();
        let mut ctx = StageContext::new(&config, &root, &mut runner);
        assert!(!ctx.diagnose(CommandSpec::new("definitely-not-installed-xyz")));
    }
}
