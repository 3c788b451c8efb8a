//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::config::{load_config, LoadedConfig};
use crate::error::Result;
use crate::host::HostRoot;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Flags shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Explicit `--config` path.
    pub config: Option<PathBuf>,
    /// Host root files are converged under.
    pub root: HostRoot,
    /// Directory searched for `sqm-provision.yml`.
    pub cwd: PathBuf,
}

impl GlobalOptions {
    /// Build options from parsed CLI flags.
    pub fn from_cli(cli: &Cli, cwd: &Path) -> Self {
        Self {
            config: cli.config.clone(),
            root: cli
                .root
                .as_ref()
                .map(|dir| HostRoot::new(dir.clone()))
                .unwrap_or_else(HostRoot::system),
            cwd: cwd.to_path_buf(),
        }
    }

    /// Discover, resolve, and validate the configuration.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        load_config(self.config.as_deref(), &self.cwd, &self.root)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    options: GlobalOptions,
}

impl CommandDispatcher {
    /// Create a new dispatcher.
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Get the global options.
    pub fn options(&self) -> &GlobalOptions {
        &self.options
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let options = self.options.clone();
        match &cli.command {
            Some(Commands::Run(args)) => super::run::RunCommand::new(options, args.clone()).execute(ui),
            Some(Commands::Plan(args)) => {
                super::plan::PlanCommand::new(options, args.clone()).execute(ui)
            }
            Some(Commands::Check) => super::check::CheckCommand::new(options).execute(ui),
            Some(Commands::Render(args)) => {
                super::render::RenderCommand::new(options, args.clone()).execute(ui)
            }
            Some(Commands::Config(args)) => {
                super::config::ConfigCommand::new(options, args.clone()).execute(ui)
            }
            Some(Commands::Last(args)) => {
                super::last::LastCommand::new(options, args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => {
                // Default to run command with default args
                super::run::RunCommand::new(options, RunArgs::default()).execute(ui)
            }
        }
    }
}
