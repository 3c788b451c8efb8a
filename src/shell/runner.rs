//! Command runners.
//!
//! Stages never spawn processes directly; they go through a
//! [`CommandRunner`] so a run can be executed, previewed, or recorded.

use std::time::Duration;

use tracing::debug;

use crate::error::{ProvisionError, Result};

use super::command::{execute, execute_streaming, CommandResult, CommandSpec, OutputLine};

/// Something that can run external commands.
pub trait CommandRunner {
    /// Run a command. A non-zero exit is a successful call returning a
    /// failed [`CommandResult`]; only a spawn failure is an `Err`.
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult>;

    /// Run a command and treat a non-zero exit as an error.
    fn run_checked(&mut self, spec: &CommandSpec) -> Result<CommandResult> {
        let result = self.run(spec)?;
        if result.success {
            Ok(result)
        } else {
            Err(ProvisionError::CommandFailed {
                command: spec.display(),
                code: result.exit_code,
            })
        }
    }

    /// True when commands are only being previewed.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs commands on the live host.
#[derive(Debug, Default)]
pub struct SystemRunner {
    stream: bool,
}

impl SystemRunner {
    /// Create a runner that captures output silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner that echoes command output line by line.
    pub fn streaming() -> Self {
        Self { stream: true }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult> {
        debug!("Running: {}", spec);
        let result = if self.stream {
            execute_streaming(
                spec,
                Box::new(|line| match line {
                    OutputLine::Stdout(s) => println!("    {}", s),
                    OutputLine::Stderr(s) => eprintln!("    {}", s),
                }),
            )?
        } else {
            execute(spec)?
        };
        debug!(
            "Finished: {} (exit {:?}, {}ms)",
            spec,
            result.exit_code,
            result.duration.as_millis()
        );
        Ok(result)
    }
}

/// Records commands without running them.
#[derive(Debug, Default)]
pub struct DryRunRunner {
    commands: Vec<CommandSpec>,
}

impl DryRunRunner {
    /// Create an empty dry-run runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands that would have run, in order.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult> {
        debug!("Would run: {}", spec);
        self.commands.push(spec.clone());
        Ok(CommandResult::success(
            String::new(),
            String::new(),
            Duration::ZERO,
        ))
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
