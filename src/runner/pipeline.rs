//! Linear pipeline execution.
//!
//! Stages run strictly in order. The first stage to return an error stops
//! the run: later stages are reported as never attempted, and nothing
//! already done is rolled back.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::ProvisionError;
use crate::stages::{stage_for, Effect, Stage, StageContext, StageName, StageReport};

/// Where the host is in the provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Nothing has run yet.
    Pending,
    Packages,
    EnvBuilt,
    GpsConfigured,
    TimeConfigured,
    ServiceInstalled,
    Checked,
    /// A stage failed; the run terminated.
    Aborted,
}

impl PipelineState {
    /// State reached once `stage` completes.
    pub fn after(stage: StageName) -> Self {
        match stage {
            StageName::Packages => PipelineState::Packages,
            StageName::Environment => PipelineState::EnvBuilt,
            StageName::Gpsd => PipelineState::GpsConfigured,
            StageName::Timesync => PipelineState::TimeConfigured,
            StageName::Service => PipelineState::ServiceInstalled,
            StageName::Health => PipelineState::Checked,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Pending => "pending",
            PipelineState::Packages => "packages",
            PipelineState::EnvBuilt => "env_built",
            PipelineState::GpsConfigured => "gps_configured",
            PipelineState::TimeConfigured => "time_configured",
            PipelineState::ServiceInstalled => "service_installed",
            PipelineState::Checked => "checked",
            PipelineState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A stage is about to start.
    StageStarting {
        stage: StageName,
        index: usize,
        total: usize,
    },
    /// A stage completed.
    StageFinished { report: &'a StageReport },
    /// A stage failed; the run stops here.
    StageFailed {
        stage: StageName,
        error: &'a ProvisionError,
    },
}

/// The stage that stopped a run.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: StageName,
    pub error: ProvisionError,
    /// Effects the stage produced before it failed.
    pub partial: StageReport,
}

/// Result of running the pipeline.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Reports of stages that completed, in order.
    pub completed: Vec<StageReport>,
    /// The failing stage, if any.
    pub failure: Option<StageFailure>,
    /// Stages after the failure that never ran.
    pub not_attempted: Vec<StageName>,
    /// Final state.
    pub state: PipelineState,
    pub duration: Duration,
}

impl PipelineOutcome {
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    /// Every effect from completed stages, plus the failing stage's partial effects.
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.completed
            .iter()
            .chain(self.failure.iter().map(|f| &f.partial))
            .flat_map(|r| r.effects.iter())
    }

    /// Report for one completed stage.
    pub fn report(&self, stage: StageName) -> Option<&StageReport> {
        self.completed.iter().find(|r| r.stage == stage)
    }
}

/// An ordered list of stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&StageName::ALL)
    }
}

impl Pipeline {
    /// Build a pipeline from stage names, in canonical order.
    pub fn new(names: &[StageName]) -> Self {
        let mut names = names.to_vec();
        names.sort();
        names.dedup();
        Self {
            stages: names.into_iter().map(stage_for).collect(),
        }
    }

    /// Build a pipeline from explicit stage implementations, run in the given order.
    pub fn from_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Names of the stages this pipeline runs.
    pub fn stage_names(&self) -> Vec<StageName> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage without progress reporting.
    pub fn run(&self, ctx: &mut StageContext<'_>) -> PipelineOutcome {
        self.run_with_progress(ctx, |_| {})
    }

    /// Run every stage, reporting progress through `on_progress`.
    pub fn run_with_progress(
        &self,
        ctx: &mut StageContext<'_>,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> PipelineOutcome {
        let start = Instant::now();
        let total = self.stages.len();
        let mut completed = Vec::new();
        let mut state = PipelineState::Pending;

        for (index, stage) in self.stages.iter().enumerate() {
            let name = stage.name();
            on_progress(RunProgress::StageStarting {
                stage: name,
                index,
                total,
            });
            info!("Stage {} starting", name);

            match stage.apply(ctx) {
                Ok(report) => {
                    on_progress(RunProgress::StageFinished { report: &report });
                    info!("Stage {} finished in {}ms", name, report.duration_ms);
                    state = PipelineState::after(name);
                    completed.push(report);
                }
                Err(e) => {
                    error!("Stage {} failed: {}", name, e);
                    on_progress(RunProgress::StageFailed {
                        stage: name,
                        error: &e,
                    });
                    let partial = ctx.finish(name);
                    let not_attempted = self.stages[index + 1..]
                        .iter()
                        .map(|s| s.name())
                        .collect();
                    return PipelineOutcome {
                        completed,
                        failure: Some(StageFailure {
                            stage: name,
                            error: e,
                            partial,
                        }),
                        not_attempted,
                        state: PipelineState::Aborted,
                        duration: start.elapsed(),
                    };
                }
            }
        }

        PipelineOutcome {
            completed,
            failure: None,
            not_attempted: Vec::new(),
            state,
            duration: start.elapsed(),
        }
    }
}
