//! Provisioning stages.
//!
//! Each stage is a leaf operation with side effects on the host. Stages
//! never spawn processes or touch files directly: they go through a
//! [`StageContext`], which routes commands to the active [`CommandRunner`]
//! and converges generated files under the [`HostRoot`]. Everything a stage
//! does is recorded as an [`Effect`].

pub mod environment;
pub mod gpsd;
pub mod health;
pub mod packages;
pub mod service;
pub mod timesync;

pub use environment::{Activation, EnvironmentStage};
pub use gpsd::GpsdStage;
pub use health::HealthStage;
pub use packages::PackagesStage;
pub use service::ServiceStage;
pub use timesync::TimesyncStage;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::ProvisioningConfig;
use crate::error::{ProvisionError, Result};
use crate::host::{FileChange, FileResource, HostRoot};
use crate::shell::{CommandResult, CommandRunner, CommandSpec};

/// The six stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    Packages,
    Environment,
    Gpsd,
    Timesync,
    Service,
    Health,
}

impl StageName {
    /// All stages in canonical order.
    pub const ALL: [StageName; 6] = [
        StageName::Packages,
        StageName::Environment,
        StageName::Gpsd,
        StageName::Timesync,
        StageName::Service,
        StageName::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Packages => "packages",
            StageName::Environment => "environment",
            StageName::Gpsd => "gpsd",
            StageName::Timesync => "timesync",
            StageName::Service => "service",
            StageName::Health => "health",
        }
    }

    /// One-line description shown next to the stage name.
    pub fn description(&self) -> &'static str {
        match self {
            StageName::Packages => "Install OS packages",
            StageName::Environment => "Build the Python environment",
            StageName::Gpsd => "Configure the GPS daemon",
            StageName::Timesync => "Point chrony at GPS time",
            StageName::Service => "Install the logger service",
            StageName::Health => "Run health checks",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageName {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        StageName::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s.trim())
            .ok_or_else(|| ProvisionError::UnknownStage {
                name: s.to_string(),
            })
    }
}

/// Pick stages from `--only` / `--skip` lists, keeping canonical order.
///
/// An empty `only` means every stage. Unknown names in either list are errors.
pub fn select_stages(only: &[String], skip: &[String]) -> Result<Vec<StageName>> {
    let only = only
        .iter()
        .map(|s| s.parse())
        .collect::<Result<Vec<StageName>>>()?;
    let skip = skip
        .iter()
        .map(|s| s.parse())
        .collect::<Result<Vec<StageName>>>()?;

    Ok(StageName::ALL
        .into_iter()
        .filter(|stage| only.is_empty() || only.contains(stage))
        .filter(|stage| !skip.contains(stage))
        .collect())
}

/// Build the stage implementation for a name.
pub fn stage_for(name: StageName) -> Box<dyn Stage> {
    match name {
        StageName::Packages => Box::new(PackagesStage),
        StageName::Environment => Box::new(EnvironmentStage),
        StageName::Gpsd => Box::new(GpsdStage),
        StageName::Timesync => Box::new(TimesyncStage),
        StageName::Service => Box::new(ServiceStage),
        StageName::Health => Box::new(HealthStage),
    }
}

/// Something a stage did, or would do on a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// An external command ran (or would run).
    CommandRan { command: String },
    /// A generated file was converged.
    FileWritten { path: PathBuf, change: FileChange },
    /// Work was skipped.
    Skipped { reason: String },
    /// A best-effort diagnostic and its output.
    Diagnostic {
        name: String,
        success: bool,
        output: String,
    },
}

/// Effects produced by one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: StageName,
    pub effects: Vec<Effect>,
    pub duration_ms: u64,
}

impl StageReport {
    /// Commands recorded in this report.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().filter_map(|e| match e {
            Effect::CommandRan { command } => Some(command.as_str()),
            _ => None,
        })
    }

    /// Diagnostics that reported failure.
    pub fn failed_diagnostics(&self) -> impl Iterator<Item = &Effect> {
        self.effects
            .iter()
            .filter(|e| matches!(e, Effect::Diagnostic { success: false, .. }))
    }
}

/// A provisioning stage.
pub trait Stage {
    /// Which stage this is.
    fn name(&self) -> StageName;

    /// Apply the stage's desired state to the host.
    fn apply(&self, ctx: &mut StageContext<'_>) -> Result<StageReport>;
}

/// Everything a stage needs: the resolved config, where the host lives,
/// and how to run commands.
pub struct StageContext<'a> {
    pub config: &'a ProvisioningConfig,
    pub root: &'a HostRoot,
    runner: &'a mut dyn CommandRunner,
    env: BTreeMap<String, String>,
    effects: Vec<Effect>,
    started: Instant,
}

impl<'a> StageContext<'a> {
    pub fn new(
        config: &'a ProvisioningConfig,
        root: &'a HostRoot,
        runner: &'a mut dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            root,
            runner,
            env: BTreeMap::new(),
            effects: Vec::new(),
            started: Instant::now(),
        }
    }

    /// True when nothing should change on the host.
    pub fn is_dry_run(&self) -> bool {
        self.runner.is_dry_run()
    }

    /// Environment overrides applied to every command run through this context.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub(crate) fn env_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.env
    }

    fn prepare(&self, spec: CommandSpec) -> CommandSpec {
        let mut spec = spec;
        for (key, value) in &self.env {
            spec.env.entry(key.clone()).or_insert_with(|| value.clone());
        }
        spec
    }

    /// Run a command; a non-zero exit aborts the stage.
    ///
    /// The failing command's output is kept as a diagnostic so it survives
    /// into the stage's partial report.
    pub fn run(&mut self, spec: CommandSpec) -> Result<CommandResult> {
        let spec = self.prepare(spec);
        let command = spec.display();
        self.effects.push(Effect::CommandRan {
            command: command.clone(),
        });

        let result = self.runner.run(&spec)?;
        if result.success {
            return Ok(result);
        }

        let output = result.combined_output();
        if !output.is_empty() {
            self.effects.push(Effect::Diagnostic {
                name: command.clone(),
                success: false,
                output,
            });
        }
        Err(ProvisionError::CommandFailed {
            command,
            code: result.exit_code,
        })
    }

    /// Run a diagnostic command. Failure (including a missing program) is
    /// recorded, never returned. On a dry run the command is only recorded.
    pub fn diagnose(&mut self, spec: CommandSpec) -> bool {
        let spec = self.prepare(spec);
        let name = spec.display();
        self.effects.push(Effect::CommandRan {
            command: name.clone(),
        });

        if self.is_dry_run() {
            let _ = self.runner.run(&spec);
            return true;
        }

        let (success, output) = match self.runner.run(&spec) {
            Ok(result) => (result.success, result.combined_output()),
            Err(e) => (false, e.to_string()),
        };
        self.diagnostic(name, success, output);
        success
    }

    /// Record a diagnostic result.
    pub fn diagnostic(&mut self, name: impl Into<String>, success: bool, output: impl Into<String>) {
        let name = name.into();
        if !success {
            warn!("Check failed: {}", name);
        }
        self.effects.push(Effect::Diagnostic {
            name,
            success,
            output: output.into(),
        });
    }

    /// Bring a generated file to its desired content. On a dry run the
    /// change is only planned.
    pub fn converge(&mut self, file: &FileResource) -> Result<FileChange> {
        let change = if self.is_dry_run() {
            file.plan(self.root)?
        } else {
            file.apply(self.root)?
        };
        self.effects.push(Effect::FileWritten {
            path: file.path.clone(),
            change,
        });
        Ok(change)
    }

    /// Record skipped work.
    pub fn skip(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        info!("Skipping: {}", reason);
        self.effects.push(Effect::Skipped { reason });
    }

    /// Close out the current stage, returning its report.
    pub fn finish(&mut self, stage: StageName) -> StageReport {
        let report = StageReport {
            stage,
            effects: std::mem::take(&mut self.effects),
            duration_ms: self.started.elapsed().as_millis() as u64,
        };
        self.started = Instant::now();
        report
    }
}
