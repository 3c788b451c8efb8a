//! Plan command implementation.
//!
//! The `sqm-provision plan` command shows what a run would change: each
//! generated file as create/update/unchanged, and the commands each stage
//! would run. It never touches the host.

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::runner::Pipeline;
use crate::shell::DryRunRunner;
use crate::stages::{select_stages, Effect, StageContext};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, GlobalOptions};
use super::display::effect_line;

/// The plan command implementation.
pub struct PlanCommand {
    options: GlobalOptions,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(options: GlobalOptions, args: PlanArgs) -> Self {
        Self { options, args }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = self.options.load_config()?;
        let stages = select_stages(&self.args.only, &self.args.skip)?;

        let mut runner = DryRunRunner::new();
        let outcome = {
            let mut ctx = StageContext::new(&loaded.config, &self.options.root, &mut runner);
            Pipeline::new(&stages).run(&mut ctx)
        };

        ui.show_header("Provisioning plan");

        let mut pending = 0;
        for report in &outcome.completed {
            ui.message(&format!("{} - {}", report.stage, report.stage.description()));
            for effect in &report.effects {
                if let Effect::FileWritten { change, .. } = effect {
                    if change.is_write() {
                        pending += 1;
                    }
                }
                if matches!(effect, Effect::Diagnostic { .. }) {
                    continue;
                }
                ui.message(&format!("    {}", effect_line(effect)));
            }
        }

        if let Some(failure) = &outcome.failure {
            ui.error(&format!(
                "Planning stopped at '{}': {}",
                failure.stage, failure.error
            ));
            return Ok(CommandResult::failure(1));
        }

        if pending == 0 {
            ui.success("All generated files are up to date");
        } else {
            ui.message(&format!("{} file(s) would change", pending));
        }

        Ok(CommandResult::success())
    }
}
