//! Primary execution: submit the command once and block on its job.
use crate::error::{chain_message, StepError, StepResult};
use crate::job::{wait_for_one, ArtifactCodec, ExecuteRequest, ExecutionEngine, Job, JobBarrier};
use crate::mediapackage::Element;

/// Terminal primary job plus the element it produced, if any.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub job: Job,
    pub artifact: Option<Element>,
}

pub fn run_execution(
    engine: &dyn ExecutionEngine,
    barrier: &dyn JobBarrier,
    codec: &dyn ArtifactCodec,
    request: &ExecuteRequest<'_>,
) -> StepResult<ExecutionResult> {
    let handle = engine
        .submit(request)
        .map_err(|err| StepError::ExecutionFailed(chain_message(&err)))?;
    tracing::debug!(job = %handle, exec = request.exec, "submitted execute job");

    let job = wait_for_one(barrier, handle)
        .map_err(|err| StepError::ExecutionFailed(chain_message(&err)))?;
    if !job.is_success() {
        return Err(StepError::ExecutionFailed(format!(
            "{} finished with status {:?}",
            job.handle, job.status
        )));
    }

    let Some(payload) = job.payload_text() else {
        tracing::info!(job = %job.handle, "execute job produced no element");
        return Ok(ExecutionResult {
            job,
            artifact: None,
        });
    };

    let artifact = codec
        .decode(payload)
        .map_err(|err| StepError::ResultParseFailed(chain_message(&err)))?;
    tracing::debug!(
        job = %job.handle,
        element = %artifact.id,
        element_type = %artifact.element_type,
        "decoded execute result"
    );
    Ok(ExecutionResult {
        job,
        artifact: Some(artifact),
    })
}
