//! Run command implementation.
//!
//! The `sqm-provision run` command executes the provisioning pipeline.
//!
//! Real runs act on the live host: the built-in runner executes commands
//! there, so files must land there too. An alternate `--root` is only
//! accepted for dry runs, unless the caller supplies its own runner.

use tracing::{debug, warn};

use crate::cli::args::RunArgs;
use crate::error::{ProvisionError, Result};
use crate::runner::{Pipeline, RunProgress};
use crate::shell::{is_elevated, CommandRunner, DryRunRunner, SystemRunner};
use crate::stages::{select_stages, StageContext, StageName};
use crate::state::RunReport;
use crate::ui::{format_duration, SpinnerHandle, UserInterface};

use super::dispatcher::{Command, CommandResult, GlobalOptions};
use super::display::{operator_guidance, show_diagnostics, show_effects, stage_summary};

/// Builds the runner a real run executes commands through.
pub type RunnerFactory = Box<dyn Fn() -> Box<dyn CommandRunner>>;

/// The run command implementation.
pub struct RunCommand {
    options: GlobalOptions,
    args: RunArgs,
    make_runner: Option<RunnerFactory>,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(options: GlobalOptions, args: RunArgs) -> Self {
        Self {
            options,
            args,
            make_runner: None,
        }
    }

    /// Execute real runs through a runner built by `factory` instead of
    /// [`SystemRunner`].
    ///
    /// The supplied runner decides where commands take effect, so it may be
    /// paired with a non-system root.
    pub fn with_runner<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn CommandRunner> + 'static,
    {
        self.make_runner = Some(Box::new(factory));
        self
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn check_root(&self) -> Result<()> {
        let root = &self.options.root;
        if self.args.dry_run || root.is_system() || self.make_runner.is_some() {
            Ok(())
        } else {
            Err(ProvisionError::ForeignRoot {
                root: root.path().to_path_buf(),
            })
        }
    }

    fn check_privileges(&self) -> Result<()> {
        if self.args.dry_run || self.args.allow_unprivileged || is_elevated() {
            Ok(())
        } else {
            Err(ProvisionError::NotPrivileged)
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = self.options.load_config()?;
        let config = &loaded.config;
        let stages = select_stages(&self.args.only, &self.args.skip)?;
        self.check_root()?;
        self.check_privileges()?;

        let dry_run = self.args.dry_run;
        let root = &self.options.root;

        let title = if dry_run {
            format!("sqm-provision v{} (dry run)", env!("CARGO_PKG_VERSION"))
        } else {
            format!("sqm-provision v{}", env!("CARGO_PKG_VERSION"))
        };
        ui.show_header(&title);
        match &loaded.source {
            Some(path) => ui.message(&format!("Config: {}", path.display())),
            None => ui.message("Config: built-in defaults"),
        }
        if !root.is_system() {
            ui.message(&format!("Root:   {}", root.path().display()));
        }

        let mut runner: Box<dyn CommandRunner> = if dry_run {
            Box::new(DryRunRunner::new())
        } else if let Some(make) = &self.make_runner {
            make()
        } else if ui.output_mode().shows_command_output() {
            Box::new(SystemRunner::streaming())
        } else {
            Box::new(SystemRunner::new())
        };

        let pipeline = Pipeline::new(&stages);
        debug!("Running stages: {:?}", pipeline.stage_names());

        let outcome = {
            let mut ctx = StageContext::new(config, root, runner.as_mut());
            let mut spinner: Option<Box<dyn SpinnerHandle>> = None;

            pipeline.run_with_progress(&mut ctx, |event| match event {
                RunProgress::StageStarting {
                    stage,
                    index,
                    total,
                } => {
                    ui.show_progress(index + 1, total);
                    spinner = Some(ui.start_spinner(&format!(
                        "{} - {}",
                        stage,
                        stage.description()
                    )));
                }
                RunProgress::StageFinished { report } => {
                    if let Some(mut s) = spinner.take() {
                        s.finish_success(&stage_summary(report));
                    }
                    if dry_run {
                        show_effects(ui, report);
                    }
                    show_diagnostics(ui, report);
                }
                RunProgress::StageFailed { stage, .. } => {
                    if let Some(mut s) = spinner.take() {
                        s.finish_error(stage.as_str());
                    }
                }
            })
        };

        if !dry_run {
            match RunReport::from_outcome(&outcome).save(root) {
                Ok(path) => debug!("Run report written to {}", path.display()),
                Err(e) => warn!("Could not write run report: {}", e),
            }
        }

        let elapsed = format_duration(outcome.duration);

        if let Some(failure) = &outcome.failure {
            show_diagnostics(ui, &failure.partial);
            ui.error(&format!(
                "Stage '{}' failed: {}",
                failure.stage, failure.error
            ));
            if !outcome.not_attempted.is_empty() {
                let names: Vec<_> = outcome.not_attempted.iter().map(|s| s.as_str()).collect();
                ui.message(&format!("Not attempted: {}", names.join(", ")));
            }
            ui.message("Changes made by earlier stages were left in place.");
            return Ok(CommandResult::failure(1));
        }

        if dry_run {
            ui.success(&format!("Dry run complete in {}; nothing was changed", elapsed));
            return Ok(CommandResult::success());
        }

        ui.success(&format!("Provisioning complete in {}", elapsed));
        if stages.contains(&StageName::Service) {
            ui.show_block("Next steps", &operator_guidance(config).join("\n"));
        }

        Ok(CommandResult::success())
    }
}
