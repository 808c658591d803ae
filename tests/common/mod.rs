//! Shared test infrastructure for integration tests.
//!
//! Scripted collaborators record every submission so tests can assert on
//! job counts, and the in-process `LocalJobQueue` serves as the barrier.
#![allow(dead_code)]

use execute_once::job::{
    ExecuteRequest, ExecutionEngine, InspectionEngine, JobHandle, JobStatus, Relocator,
};
use execute_once::local::LocalJobQueue;
use execute_once::{Element, ElementType, ExecuteOnceStep, Flavor, MediaPackage, StepServices};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Terminal state a scripted engine reports for every job it receives.
#[derive(Debug, Clone)]
pub struct ScriptedJob {
    pub status: JobStatus,
    pub payload: Option<String>,
    pub queue_time: Duration,
}

impl ScriptedJob {
    pub fn finished(payload: Option<String>, queue_time: Duration) -> Self {
        Self {
            status: JobStatus::Finished,
            payload,
            queue_time,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: JobStatus::Failed,
            payload: None,
            queue_time: Duration::from_millis(1),
        }
    }

    pub fn with_element(element: &Element, queue_time: Duration) -> Self {
        let payload = serde_json::to_string(element).expect("serialize element");
        Self::finished(Some(payload), queue_time)
    }
}

/// Owned copy of the fields an `ExecuteRequest` carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub exec: String,
    pub params: Option<String>,
    pub package_id: String,
    pub element_count: usize,
    pub output_filename: Option<String>,
    pub expected_type: Option<ElementType>,
    pub source_flavor: Option<Flavor>,
    pub source_tags: Vec<String>,
}

pub struct ScriptedExecution {
    queue: Arc<LocalJobQueue>,
    script: ScriptedJob,
    submissions: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedExecution {
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ExecutionEngine for ScriptedExecution {
    fn submit(&self, request: &ExecuteRequest<'_>) -> anyhow::Result<JobHandle> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push(RecordedRequest {
                exec: request.exec.to_string(),
                params: request.params.map(str::to_string),
                package_id: request.package.id.clone(),
                element_count: request.package.len(),
                output_filename: request.output_filename.map(str::to_string),
                expected_type: request.expected_type,
                source_flavor: request.source_flavor.cloned(),
                source_tags: request.source_tags.to_vec(),
            });
        self.queue.record(
            self.script.status,
            self.script.payload.clone(),
            self.script.queue_time,
        )
    }
}

pub struct ScriptedInspection {
    queue: Arc<LocalJobQueue>,
    script: ScriptedJob,
    locations: Mutex<Vec<String>>,
}

impl ScriptedInspection {
    pub fn submissions(&self) -> usize {
        self.locations().len()
    }

    pub fn locations(&self) -> Vec<String> {
        self.locations.lock().expect("locations lock").clone()
    }
}

impl InspectionEngine for ScriptedInspection {
    fn submit(&self, location: &str) -> anyhow::Result<JobHandle> {
        self.locations
            .lock()
            .expect("locations lock")
            .push(location.to_string());
        self.queue.record(
            self.script.status,
            self.script.payload.clone(),
            self.script.queue_time,
        )
    }
}

/// Relocator that computes the namespaced path without touching disk.
pub struct PathRelocator {
    fail: bool,
}

impl Relocator for PathRelocator {
    fn move_to(
        &self,
        location: &str,
        namespace: &str,
        element_id: &str,
        filename: Option<&str>,
    ) -> anyhow::Result<String> {
        if self.fail {
            return Err(anyhow::anyhow!("workspace unavailable"));
        }
        let name = match filename {
            Some(name) => name,
            None => location.rsplit('/').next().unwrap_or(location),
        };
        Ok(format!("/workspace/{namespace}/{element_id}/{name}"))
    }
}

pub struct Harness {
    pub execution: Arc<ScriptedExecution>,
    pub inspection: Arc<ScriptedInspection>,
    pub step: ExecuteOnceStep,
}

impl Harness {
    pub fn new(execution: ScriptedJob, inspection: ScriptedJob) -> Self {
        Self::build(execution, inspection, false)
    }

    pub fn with_failing_relocator(execution: ScriptedJob, inspection: ScriptedJob) -> Self {
        Self::build(execution, inspection, true)
    }

    fn build(execution: ScriptedJob, inspection: ScriptedJob, fail_relocation: bool) -> Self {
        let queue = Arc::new(LocalJobQueue::new());
        let execution = Arc::new(ScriptedExecution {
            queue: queue.clone(),
            script: execution,
            submissions: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        });
        let inspection = Arc::new(ScriptedInspection {
            queue: queue.clone(),
            script: inspection,
            locations: Mutex::new(Vec::new()),
        });
        let services = StepServices::new(
            execution.clone(),
            inspection.clone(),
            queue,
            Arc::new(PathRelocator {
                fail: fail_relocation,
            }),
        );
        Self {
            execution,
            inspection,
            step: ExecuteOnceStep::new(services),
        }
    }
}

pub fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// A package holding one source track.
pub fn source_package() -> MediaPackage {
    let mut package = MediaPackage::new("mp-1");
    package.add(
        Element::new("source-1", ElementType::Track, "/inbox/source.mov")
            .with_flavor(Flavor::new("presenter", "source"))
            .with_tags(["ingest"]),
    );
    package
}
