//! Last command implementation.
//!
//! The `sqm-provision last` command shows the report of the most recent run.

use crate::cli::args::LastArgs;
use crate::error::Result;
use crate::state::RunReport;
use crate::ui::{format_duration, format_relative_time, UserInterface};

use super::dispatcher::{Command, CommandResult, GlobalOptions};
use super::display::{show_effects, stage_summary};

/// The last command implementation.
pub struct LastCommand {
    options: GlobalOptions,
    args: LastArgs,
}

impl LastCommand {
    /// Create a new last command.
    pub fn new(options: GlobalOptions, args: LastArgs) -> Self {
        Self { options, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &LastArgs {
        &self.args
    }
}

impl Command for LastCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(report) = RunReport::load(&self.options.root)? else {
            ui.message("No runs recorded");
            return Ok(CommandResult::success());
        };

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(CommandResult::success());
        }

        ui.show_header("Last run");
        ui.message(&format!(
            "When:     {} ({})",
            format_relative_time(report.timestamp),
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        ui.message(&format!(
            "Duration: {}",
            format_duration(std::time::Duration::from_millis(report.duration_ms))
        ));
        ui.message(&format!("State:    {}", report.state));

        for stage in &report.stages {
            if Some(stage.stage) == report.failed_stage {
                ui.error(&stage_summary(stage));
            } else {
                ui.success(&stage_summary(stage));
            }
            if ui.output_mode().shows_command_output() {
                show_effects(ui, stage);
            }
        }
        for stage in &report.not_attempted {
            ui.message(&format!("○ {} (not attempted)", stage));
        }

        match (&report.failed_stage, &report.error) {
            (Some(stage), Some(error)) => ui.error(&format!("Stage '{}' failed: {}", stage, error)),
            _ => ui.success("Run succeeded"),
        }

        Ok(CommandResult::success())
    }
}
