//! The execute-once workflow step.
//!
//! Runs one external command against a media package, inspects the result if
//! it is a track, and attaches it to the package. Collaborators are injected
//! through [`StepServices`]; there is no global state.
use crate::config::StepConfig;
use crate::error::StepResult;
use crate::inspection::inspect_if_track;
use crate::job::{
    ArtifactCodec, ExecuteRequest, ExecutionEngine, InspectionEngine, JobBarrier,
    JsonArtifactCodec, Relocator,
};
use crate::mediapackage::MediaPackage;
use crate::orchestrator::run_execution;
use crate::reconcile::{attach, AttachOptions};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const STEP_ID: &str = "execute-once";
pub const STEP_DESCRIPTION: &str = "Executes command line workflow operations in workers";

/// What the pipeline controller should do after this step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran; `element` is the id of the attached result, if any.
    Continue {
        elapsed: Duration,
        element: Option<String>,
    },
    Skip,
}

impl StepOutcome {
    pub fn elapsed(&self) -> Duration {
        match self {
            StepOutcome::Continue { elapsed, .. } => *elapsed,
            StepOutcome::Skip => Duration::ZERO,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, StepOutcome::Skip)
    }
}

#[derive(Clone)]
pub struct StepServices {
    pub execution: Arc<dyn ExecutionEngine>,
    pub inspection: Arc<dyn InspectionEngine>,
    pub barrier: Arc<dyn JobBarrier>,
    pub relocator: Arc<dyn Relocator>,
    pub codec: Arc<dyn ArtifactCodec>,
}

impl StepServices {
    /// Services using the JSON codec.
    pub fn new(
        execution: Arc<dyn ExecutionEngine>,
        inspection: Arc<dyn InspectionEngine>,
        barrier: Arc<dyn JobBarrier>,
        relocator: Arc<dyn Relocator>,
    ) -> Self {
        Self {
            execution,
            inspection,
            barrier,
            relocator,
            codec: Arc::new(JsonArtifactCodec),
        }
    }
}

pub struct ExecuteOnceStep {
    services: StepServices,
}

impl ExecuteOnceStep {
    pub fn new(services: StepServices) -> Self {
        Self { services }
    }

    pub fn id(&self) -> &'static str {
        STEP_ID
    }

    /// Validate raw options, then run.
    pub fn execute(
        &self,
        package: &mut MediaPackage,
        options: &BTreeMap<String, String>,
    ) -> StepResult<StepOutcome> {
        let config = StepConfig::from_options(options)?;
        self.run(package, &config)
    }

    pub fn run(&self, package: &mut MediaPackage, config: &StepConfig) -> StepResult<StepOutcome> {
        tracing::debug!(step = STEP_ID, package = %package.id, exec = %config.exec, "running step");
        let services = &self.services;

        let execution = {
            let request = ExecuteRequest {
                exec: &config.exec,
                params: config.params.as_deref(),
                package: &*package,
                output_filename: config.output_filename.as_deref(),
                expected_type: config.expected_type,
                source_flavor: config.source_flavor.as_ref(),
                source_tags: &config.source_tags,
            };
            run_execution(
                services.execution.as_ref(),
                services.barrier.as_ref(),
                services.codec.as_ref(),
                &request,
            )?
        };
        let elapsed = execution.job.queue_time;

        let Some(artifact) = execution.artifact else {
            return Ok(StepOutcome::Continue {
                elapsed,
                element: None,
            });
        };

        let artifact = inspect_if_track(
            services.inspection.as_ref(),
            services.barrier.as_ref(),
            services.codec.as_ref(),
            artifact,
        )?;

        let options = AttachOptions {
            output_filename: config.output_filename.as_deref(),
            target_flavor: config.target_flavor.as_ref(),
            tag_patch: config.target_tags.as_ref(),
        };
        let attached = attach(package, services.relocator.as_ref(), artifact, &options)?;

        tracing::info!(
            step = STEP_ID,
            package = %package.id,
            element = %attached.id,
            elapsed_ms = elapsed.as_millis() as u64,
            "execute operation completed"
        );
        Ok(StepOutcome::Continue {
            elapsed,
            element: Some(attached.id),
        })
    }

    /// The controller chose not to run this step; nothing is touched.
    pub fn skip(&self, _package: &MediaPackage) -> StepOutcome {
        StepOutcome::Skip
    }
}
