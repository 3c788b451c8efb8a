//! Persisted record of the last provisioning run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::host::HostRoot;
use crate::runner::{PipelineOutcome, PipelineState};
use crate::stages::{StageName, StageReport};

/// Where the last run report lives on the host.
pub const REPORT_PATH: &str = "/var/lib/sqm-provision/last-run.json";

/// Summary of one run, written after every real (non dry-run) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run finished.
    pub timestamp: DateTime<Utc>,

    /// Version of the tool that produced the report.
    pub version: String,

    pub success: bool,

    /// Final pipeline state.
    pub state: PipelineState,

    /// Stage that stopped the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<StageName>,

    /// Error message of the failing stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Completed stages, followed by the failing stage's partial report.
    pub stages: Vec<StageReport>,

    #[serde(default)]
    pub not_attempted: Vec<StageName>,

    pub duration_ms: u64,
}

impl RunReport {
    /// Build a report from a pipeline outcome, stamped now.
    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        let mut stages = outcome.completed.clone();
        if let Some(failure) = &outcome.failure {
            stages.push(failure.partial.clone());
        }

        Self {
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            success: outcome.success(),
            state: outcome.state,
            failed_stage: outcome.failure.as_ref().map(|f| f.stage),
            error: outcome.failure.as_ref().map(|f| f.error.to_string()),
            stages,
            not_attempted: outcome.not_attempted.clone(),
            duration_ms: outcome.duration.as_millis() as u64,
        }
    }

    /// Report file under `root`.
    pub fn path(root: &HostRoot) -> PathBuf {
        root.resolve(Path::new(REPORT_PATH))
    }

    /// Write the report as pretty JSON, atomically.
    pub fn save(&self, root: &HostRoot) -> Result<PathBuf> {
        let path = Self::path(root);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;

        Ok(path)
    }

    /// Load the last report, if one was recorded.
    pub fn load(root: &HostRoot) -> Result<Option<Self>> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{finalize, ProvisioningConfig};
    use crate::runner::Pipeline;
    use crate::shell::RecordingRunner;
    use crate::stages::{Effect, StageContext};
    use tempfile::TempDir;

    fn run(root: &HostRoot, runner: &mut RecordingRunner) -> PipelineOutcome {
        let config = finalize(&ProvisioningConfig::default()).unwrap();
        let mut ctx = StageContext::new(&config, root, runner);
        Pipeline::default().run(&mut ctx)
    }

    #[test]
    fn missing_report_loads_as_none() {
        let temp = TempDir::new().unwrap();
        assert!(RunReport::load(&HostRoot::new(temp.path())).unwrap().is_none());
    }

    #[test]
    fn save_and_load() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let outcome = run(&root, &mut RecordingRunner::new());

        let report = RunReport::from_outcome(&outcome);
        let path = report.save(&root).unwrap();
        assert!(path.starts_with(temp.path()));

        let loaded = RunReport::load(&root).unwrap().unwrap();
        assert_eq!(loaded, report);
        assert!(loaded.success);
        assert_eq!(loaded.state, PipelineState::Checked);
    }

    #[test]
    fn failed_run_records_stage_and_effects() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let mut runner = RecordingRunner::new();
        runner.fail_on("daemon-reload", 1);
        let outcome = run(&root, &mut runner);

        let report = RunReport::from_outcome(&outcome);
        assert!(!report.success);
        assert_eq!(report.failed_stage, Some(StageName::Service));
        assert_eq!(report.not_attempted, vec![StageName::Health]);
        assert!(report.error.as_deref().unwrap().contains("daemon-reload"));

        let service = report.stages.last().unwrap();
        assert_eq!(service.stage, StageName::Service);
        assert!(matches!(service.effects[0], Effect::FileWritten { .. }));
    }

    #[test]
    fn json_uses_snake_case_tags() {
        let temp = TempDir::new().unwrap();
        let root = HostRoot::new(temp.path());
        let outcome = run(&root, &mut RecordingRunner::new());
        let json = serde_json::to_string(&RunReport::from_outcome(&outcome)).unwrap();
        assert!(json.contains("\"kind\":\"file_written\""));
        assert!(json.contains("\"state\":\"checked\""));
    }
}
