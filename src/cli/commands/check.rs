//! Check command implementation.
//!
//! The `sqm-provision check` command runs the health stage on its own. It
//! needs no privileges and always exits 0; failed checks are warnings.

use crate::error::Result;
use crate::runner::Pipeline;
use crate::shell::SystemRunner;
use crate::stages::{StageContext, StageName};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, GlobalOptions};
use super::display::show_diagnostics;

/// The check command implementation.
pub struct CheckCommand {
    options: GlobalOptions,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = self.options.load_config()?;
        let mut runner = SystemRunner::new();

        ui.show_header("Health checks");
        let mut spinner = ui.start_spinner("Running health checks");
        let outcome = {
            let mut ctx = StageContext::new(&loaded.config, &self.options.root, &mut runner);
            Pipeline::new(&[StageName::Health]).run(&mut ctx)
        };

        let Some(report) = outcome.report(StageName::Health) else {
            spinner.finish_error("Health checks did not run");
            return Ok(CommandResult::failure(1));
        };

        let failed = report.failed_diagnostics().count();
        if failed == 0 {
            spinner.finish_success("All checks passed");
        } else {
            spinner.finish_skipped(&format!("{} check(s) need attention", failed));
        }
        show_diagnostics(ui, report);

        Ok(CommandResult::success())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::host::HostRoot;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn check_always_exits_zero() {
        let temp = TempDir::new().unwrap();
        let cmd = CheckCommand::new(GlobalOptions {
            config: None,
            root: HostRoot::new(temp.path().join("root")),
            cwd: temp.path().to_path_buf(),
        });
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert_eq!(ui.headers(), &["Health checks".to_string()]);
        assert!(!temp.path().join("root").exists());
    }
}
