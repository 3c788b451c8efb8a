//! Render command implementation.
//!
//! The `sqm-provision render <artifact>` command prints a generated file.

use crate::cli::args::RenderArgs;
use crate::error::Result;
use crate::render::render_artifact;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, GlobalOptions};

/// The render command implementation.
pub struct RenderCommand {
    options: GlobalOptions,
    args: RenderArgs,
}

impl RenderCommand {
    /// Create a new render command.
    pub fn new(options: GlobalOptions, args: RenderArgs) -> Self {
        Self { options, args }
    }
}

impl Command for RenderCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = self.options.load_config()?;
        let file = render_artifact(&self.args.artifact, &loaded.config)?;
        print!("{}", file.content);
        Ok(CommandResult::success())
    }
}
