//! Recording command runner for testing.
//!
//! `RecordingRunner` implements [`CommandRunner`] without touching the host.
//! It records every command and can be scripted to fail or to return
//! canned output for commands matching a needle.
//!
//! # Example
//!
//! ```
//! use sqm_provision::shell::{CommandRunner, CommandSpec, RecordingRunner};
//!
//! let mut runner = RecordingRunner::new();
//! runner.fail_on("apt-get install", 100);
//!
//! assert!(runner.run_checked(&CommandSpec::new("apt-get").arg("update")).is_ok());
//! assert!(runner
//!     .run_checked(&CommandSpec::new("apt-get").args(["install", "-y", "gpsd"]))
//!     .is_err());
//! assert_eq!(runner.commands().len(), 2);
//! ```

use std::time::Duration;

use crate::error::Result;

use super::command::{CommandResult, CommandSpec};
use super::runner::CommandRunner;

#[derive(Debug, Clone)]
struct Script {
    needle: String,
    exit_code: i32,
    stdout: String,
}

/// Command runner that records instead of executing.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Vec<CommandSpec>,
    scripts: Vec<Script>,
}

impl RecordingRunner {
    /// Create a runner where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make commands whose display form contains `needle` exit with `exit_code`.
    pub fn fail_on(&mut self, needle: &str, exit_code: i32) {
        self.scripts.push(Script {
            needle: needle.to_string(),
            exit_code,
            stdout: String::new(),
        });
    }

    /// Make commands whose display form contains `needle` print `stdout`.
    pub fn respond(&mut self, needle: &str, stdout: &str) {
        self.scripts.push(Script {
            needle: needle.to_string(),
            exit_code: 0,
            stdout: stdout.to_string(),
        });
    }

    /// All commands run so far, in order.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// Display forms of all commands run so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.commands.iter().map(CommandSpec::display).collect()
    }

    /// Check whether any command containing `needle` was run.
    pub fn ran(&self, needle: &str) -> bool {
        self.commands.iter().any(|c| c.display().contains(needle))
    }

    /// Index of the first command containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|c| c.display().contains(needle))
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult> {
        self.commands.push(spec.clone());
        let line = spec.display();

        let script = self
            .scripts
            .iter()
            .rev()
            .find(|s| line.contains(&s.needle));

        Ok(match script {
            Some(s) if s.exit_code != 0 => CommandResult::failure(
                Some(s.exit_code),
                s.stdout.clone(),
                format!("{}: scripted failure", spec.program),
                Duration::ZERO,
            ),
            Some(s) => CommandResult::success(s.stdout.clone(), String::new(), Duration::ZERO),
            None => CommandResult::success(String::new(), String::new(), Duration::ZERO),
        })
    }
}
