//! Job model and the collaborator seams the step talks to.
//!
//! The step never runs programs, probes media, or moves files itself. It
//! submits jobs to an [`ExecutionEngine`] or [`InspectionEngine`], blocks on
//! a [`JobBarrier`] for exactly the handle it submitted, and hands storage
//! moves to a [`Relocator`]. Payloads are decoded with an [`ArtifactCodec`].
use crate::mediapackage::{Element, ElementType, Flavor, MediaPackage};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobHandle(pub u64);

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Lifecycle state of a job. A barrier only returns jobs in a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub handle: JobHandle,
    pub status: JobStatus,
    /// Serialized element description; blank means nothing was produced.
    pub payload: Option<String>,
    pub queue_time: Duration,
}

impl Job {
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Finished
    }

    /// Trimmed payload, or `None` when the job produced nothing.
    pub fn payload_text(&self) -> Option<&str> {
        self.payload
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Everything the execution engine needs to run the command once.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteRequest<'a> {
    pub exec: &'a str,
    pub params: Option<&'a str>,
    pub package: &'a MediaPackage,
    pub output_filename: Option<&'a str>,
    pub expected_type: Option<ElementType>,
    /// Input selection hints; interpreted by the engine only.
    pub source_flavor: Option<&'a Flavor>,
    pub source_tags: &'a [String],
}

pub trait ExecutionEngine: Send + Sync {
    fn submit(&self, request: &ExecuteRequest<'_>) -> Result<JobHandle>;
}

pub trait InspectionEngine: Send + Sync {
    fn submit(&self, location: &str) -> Result<JobHandle>;
}

pub trait JobBarrier: Send + Sync {
    /// Block until every handle reaches a terminal state.
    fn wait_for(&self, handles: &[JobHandle]) -> Result<Vec<Job>>;
}

pub trait Relocator: Send + Sync {
    /// Move `location` under `namespace/element_id/filename`, returning the new location.
    fn move_to(
        &self,
        location: &str,
        namespace: &str,
        element_id: &str,
        filename: Option<&str>,
    ) -> Result<String>;
}

pub trait ArtifactCodec: Send + Sync {
    fn decode(&self, payload: &str) -> Result<Element>;
    fn encode(&self, element: &Element) -> Result<String>;
}

/// Element descriptions exchanged as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArtifactCodec;

impl ArtifactCodec for JsonArtifactCodec {
    fn decode(&self, payload: &str) -> Result<Element> {
        serde_json::from_str(payload).context("parse element JSON")
    }

    fn encode(&self, element: &Element) -> Result<String> {
        serde_json::to_string(element).context("serialize element JSON")
    }
}

/// Submit-then-block for a single handle.
pub(crate) fn wait_for_one(barrier: &dyn JobBarrier, handle: JobHandle) -> Result<Job> {
    let jobs = barrier.wait_for(&[handle])?;
    jobs.into_iter()
        .find(|job| job.handle == handle)
        .with_context(|| format!("barrier returned no status for {handle}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(payload: Option<&str>) -> Job {
        Job {
            handle: JobHandle(7),
            status: JobStatus::Finished,
            payload: payload.map(str::to_string),
            queue_time: Duration::from_millis(5),
        }
    }

    #[test]
    fn blank_payload_means_no_artifact() {
        assert_eq!(job(None).payload_text(), None);
        assert_eq!(job(Some("  \n")).payload_text(), None);
        assert_eq!(job(Some(" {} ")).payload_text(), Some("{}"));
    }

    #[test]
    fn json_codec_rejects_garbage() {
        let codec = JsonArtifactCodec;
        assert!(codec.decode("<track/>").is_err());
        let element = codec
            .decode(r#"{"id":"t","type":"track","uri":"/x.mp4"}"#)
            .expect("decode element");
        assert!(element.is_track());
        assert!(element.tags.is_empty());
    }
}
