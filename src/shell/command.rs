//! External command execution.
//!
//! Commands are argv vectors, never shell strings: paths from the
//! configuration reach the child process verbatim.

use crate::error::{ProvisionError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// A command to run: program, arguments, environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path.
    pub program: String,

    /// Arguments, passed as-is.
    pub args: Vec<String>,

    /// Environment variables (merged with the inherited environment).
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Start building a command for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for this command.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Human-readable command line (arguments with spaces are quoted).
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Stdout followed by stderr, trimmed.
    pub fn combined_output(&self) -> String {
        let mut out = self.stdout.trim_end().to_string();
        let err = self.stderr.trim_end();
        if !err.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(err);
        }
        out
    }
}

/// Output line from command execution.
#[derive(Debug, Clone)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output.
pub type OutputCallback = Box<dyn Fn(OutputLine) + Send>;

fn build(spec: &CommandSpec) -> Command {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    cmd.envs(&spec.env);
    cmd
}

fn spawn_failed(spec: &CommandSpec, source: io::Error) -> ProvisionError {
    ProvisionError::SpawnFailed {
        command: spec.display(),
        source,
    }
}

/// Execute a command, capturing its output.
pub fn execute(spec: &CommandSpec) -> Result<CommandResult> {
    let start = Instant::now();

    let output = build(spec)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_failed(spec, e))?;

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Execute a command, passing each output line to `callback` as it arrives.
///
/// The full output is still collected into the returned result.
pub fn execute_streaming(spec: &CommandSpec, callback: OutputCallback) -> Result<CommandResult> {
    let start = Instant::now();

    let mut child = build(spec)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_failed(spec, e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_failed(spec, io::Error::other("stdout not captured")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| spawn_failed(spec, io::Error::other("stderr not captured")))?;

    let (tx, rx) = mpsc::channel();
    let tx_stderr = tx.clone();

    let stdout_handle = thread::spawn(move || {
        let mut collected = String::new();
        for line in BufReader::new(stdout).lines().map_while(std::result::Result::ok) {
            collected.push_str(&line);
            collected.push('\n');
            let _ = tx.send(OutputLine::Stdout(line));
        }
        collected
    });

    let stderr_handle = thread::spawn(move || {
        let mut collected = String::new();
        for line in BufReader::new(stderr).lines().map_while(std::result::Result::ok) {
            collected.push_str(&line);
            collected.push('\n');
            let _ = tx_stderr.send(OutputLine::Stderr(line));
        }
        collected
    });

    for line in rx {
        callback(line);
    }

    let stdout_output = stdout_handle.join().unwrap_or_default();
    let stderr_output = stderr_handle.join().unwrap_or_default();

    let status = child.wait().map_err(|e| spawn_failed(spec, e))?;
    let duration = start.elapsed();

    if status.success() {
        Ok(CommandResult::success(stdout_output, stderr_output, duration))
    } else {
        Ok(CommandResult::failure(
            status.code(),
            stdout_output,
            stderr_output,
            duration,
        ))
    }
}
