//! OS package installation.

use crate::error::Result;
use crate::shell::CommandSpec;

use super::{Stage, StageContext, StageName, StageReport};

/// Refreshes the package index, then installs every configured package.
pub struct PackagesStage;

impl PackagesStage {
    /// `apt-get update`
    pub fn update_command() -> CommandSpec {
        CommandSpec::new("apt-get")
            .arg("update")
            .env("DEBIAN_FRONTEND", "noninteractive")
    }

    /// `apt-get install -y <packages...>`
    pub fn install_command(packages: &[String]) -> CommandSpec {
        CommandSpec::new("apt-get")
            .args(["install", "-y"])
            .args(packages.iter().cloned())
            .env("DEBIAN_FRONTEND", "noninteractive")
    }
}

impl Stage for PackagesStage {
    fn name(&self) -> StageName {
        StageName::Packages
    }

    fn apply(&self, ctx: &mut StageContext<'_>) -> Result<StageReport> {
        ctx.run(Self::update_command())?;
        let install = Self::install_command(&ctx.config.packages);
        ctx.run(install)?;
        Ok(ctx.finish(self.name()))
    }
}
