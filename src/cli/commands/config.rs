//! Config command implementation.
//!
//! The `sqm-provision config` command shows the resolved configuration.

use crate::cli::args::ConfigArgs;
use crate::error::{ProvisionError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, GlobalOptions};

/// The config command implementation.
pub struct ConfigCommand {
    options: GlobalOptions,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(options: GlobalOptions, args: ConfigArgs) -> Self {
        Self { options, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = self.options.load_config()?;

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&loaded.config)?);
        } else {
            match &loaded.source {
                Some(path) => println!("# {}", path.display()),
                None => println!("# built-in defaults"),
            }
            let yaml = serde_yaml::to_string(&loaded.config)
                .map_err(|e| ProvisionError::Other(e.into()))?;
            print!("{}", yaml);
        }

        Ok(CommandResult::success())
    }
}
