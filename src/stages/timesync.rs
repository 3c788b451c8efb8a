//! chrony drop-in for the GPS reference clock.

use crate::error::Result;
use crate::render::render_chrony_dropin;
use crate::shell::CommandSpec;

use super::{Stage, StageContext, StageName, StageReport};

/// Writes the chrony drop-in and restarts chrony.
pub struct TimesyncStage;

impl Stage for TimesyncStage {
    fn name(&self) -> StageName {
        StageName::Timesync
    }

    fn apply(&self, ctx: &mut StageContext<'_>) -> Result<StageReport> {
        ctx.converge(&render_chrony_dropin())?;
        ctx.run(CommandSpec::new("systemctl").args(["restart", "chrony"]))?;
        Ok(ctx.finish(self.name()))
    }
}
