//! systemd unit for the logger.

use crate::error::Result;
use crate::render::render_service_unit;
use crate::shell::CommandSpec;

use super::{Stage, StageContext, StageName, StageReport};

/// Installs the unit, reloads systemd, and enables the service.
pub struct ServiceStage;

impl Stage for ServiceStage {
    fn name(&self) -> StageName {
        StageName::Service
    }

    fn apply(&self, ctx: &mut StageContext<'_>) -> Result<StageReport> {
        let config = ctx.config;
        ctx.converge(&render_service_unit(config))?;
        ctx.run(CommandSpec::new("systemctl").arg("daemon-reload"))?;
        ctx.run(
            CommandSpec::new("systemctl")
                .args(["enable", "--now"])
                .arg(config.unit_name()),
        )?;
        Ok(ctx.finish(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{finalize, ProvisioningConfig};
    use crate::host::HostRoot;
    use crate::shell::RecordingRunner;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn installs_unit_and_enables_service() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let config = finalize(&ProvisioningConfig::default()).unwrap();
        let mut runner = RecordingRunner::new();
        let mut ctx = StageContext::new(&config, &root, &mut runner);
        ServiceStage.apply(&mut ctx).unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "systemctl daemon-reload",
                "systemctl enable --now sqm-logger.service"
            ]
        );
        let unit = fs::read_to_string(root.resolve(&config.unit_path())).unwrap();
        assert!(unit.contains(
            "ExecStart=/usr/bin/screen -dmS sqm /home/pi/sqm/venv/bin/python /home/pi/sqm/main.py"
        ));
    }
}
