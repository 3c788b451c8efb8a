//! GPS daemon configuration.

use crate::error::Result;
use crate::render::render_gpsd_defaults;
use crate::shell::CommandSpec;

use super::{Stage, StageContext, StageName, StageReport};

/// Writes `/etc/default/gpsd` and enables the daemon.
///
/// The device path is not checked here; a wrong device shows up in the
/// health stage.
pub struct GpsdStage;

impl Stage for GpsdStage {
    fn name(&self) -> StageName {
        StageName::Gpsd
    }

    fn apply(&self, ctx: &mut StageContext<'_>) -> Result<StageReport> {
        let defaults = render_gpsd_defaults(ctx.config);
        ctx.converge(&defaults)?;
        ctx.run(CommandSpec::new("systemctl").args(["enable", "--now", "gpsd"]))?;
        Ok(ctx.finish(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{finalize, ProvisioningConfig};
    use crate::host::{FileChange, HostRoot};
    use crate::render::GPSD_DEFAULTS_PATH;
    use crate::shell::RecordingRunner;
    use crate::stages::Effect;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn writes_defaults_then_enables() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let config = finalize(&ProvisioningConfig::default()).unwrap();
        let mut runner = RecordingRunner::new();
        let mut ctx = StageContext::new(&config, &root, &mut runner);
        let report = GpsdStage.apply(&mut ctx).unwrap();

        let written = fs::read_to_string(root.resolve(Path::new(GPSD_DEFAULTS_PATH))).unwrap();
        assert!(written.contains("DEVICES=\"/dev/ttyACM0\""));
        assert_eq!(runner.command_lines(), vec!["systemctl enable --now gpsd"]);
        assert_eq!(
            report.effects[0],
            Effect::FileWritten {
                path: GPSD_DEFAULTS_PATH.into(),
                change: FileChange::Create
            }
        );
    }

    #[test]
    fn nonexistent_device_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let config = finalize(&ProvisioningConfig {
            gps_device: "/dev/does-not-exist".into(),
            ..Default::default()
        })
        .unwrap();
        let mut runner = RecordingRunner::new();
        let mut ctx = StageContext::new(&config, &root, &mut runner);
        assert!(GpsdStage.apply(&mut ctx).is_ok());
    }
}
