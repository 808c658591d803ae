use crate::job::{Job, JobBarrier, JobHandle, JobStatus};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-process job registry.
///
/// Local engines run their work synchronously inside `submit` and record the
/// job here in a terminal state, so waiting on a handle never blocks.
#[derive(Debug, Default)]
pub struct LocalJobQueue {
    next_id: AtomicU64,
    jobs: Mutex<BTreeMap<JobHandle, Job>>,
}

impl LocalJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &self,
        status: JobStatus,
        payload: Option<String>,
        queue_time: Duration,
    ) -> Result<JobHandle> {
        let handle = JobHandle(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let job = Job {
            handle,
            status,
            payload,
            queue_time,
        };
        self.jobs
            .lock()
            .map_err(|_| anyhow!("job registry lock poisoned"))?
            .insert(handle, job);
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JobBarrier for LocalJobQueue {
    fn wait_for(&self, handles: &[JobHandle]) -> Result<Vec<Job>> {
        let jobs = self
            .jobs
            .lock()
            .map_err(|_| anyhow!("job registry lock poisoned"))?;
        handles
            .iter()
            .map(|handle| {
                let job = jobs
                    .get(handle)
                    .ok_or_else(|| anyhow!("unknown job {handle}"))?;
                if !job.status.is_terminal() {
                    return Err(anyhow!("{handle} is still {:?}", job.status));
                }
                Ok(job.clone())
            })
            .collect()
    }
}
