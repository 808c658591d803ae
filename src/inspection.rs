//! Follow-up inspection for track results.
//!
//! Only tracks are inspected. A track is never attached without a successful
//! inspection; the inspected description replaces the executed one.
use crate::error::{chain_message, StepError, StepResult};
use crate::job::{wait_for_one, ArtifactCodec, InspectionEngine, JobBarrier};
use crate::mediapackage::Element;

pub fn inspect_if_track(
    engine: &dyn InspectionEngine,
    barrier: &dyn JobBarrier,
    codec: &dyn ArtifactCodec,
    artifact: Element,
) -> StepResult<Element> {
    if !artifact.is_track() {
        return Ok(artifact);
    }

    let location = artifact.location.as_str();
    let fail = |message: String| StepError::inspection(location, message);

    let handle = engine
        .submit(location)
        .map_err(|err| fail(chain_message(&err)))?;
    tracing::debug!(job = %handle, location, "submitted inspection job");

    let job = wait_for_one(barrier, handle).map_err(|err| fail(chain_message(&err)))?;
    if !job.is_success() {
        return Err(fail(format!(
            "{} finished with status {:?}",
            job.handle, job.status
        )));
    }

    let payload = job
        .payload_text()
        .ok_or_else(|| fail(format!("{} returned no element", job.handle)))?;
    let inspected = codec
        .decode(payload)
        .map_err(|err| fail(chain_message(&err)))?;
    tracing::info!(
        job = %job.handle,
        element = %inspected.id,
        duration_ms = inspected.duration,
        "inspected track"
    );
    Ok(inspected)
}
