//! Local collaborators: run the step on one machine without a job cluster.
mod engine;
mod inspect;
mod queue;
mod relocate;

pub use engine::ProcessExecutionEngine;
pub use inspect::FileInspectionEngine;
pub use queue::LocalJobQueue;
pub use relocate::WorkspaceRelocator;

use crate::step::StepServices;
use std::path::PathBuf;
use std::sync::Arc;

/// Layout of a local workspace root.
#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    root: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Per-job working directories for executed commands.
    pub fn scratch_dir(&self) -> PathBuf {
        self.root.join("scratch")
    }

    /// Relocated element files, namespaced by package id.
    pub fn packages_dir(&self) -> PathBuf {
        self.root.join("packages")
    }
}

/// Wire local engines, queue, and relocator into step services.
pub fn local_services(paths: &WorkspacePaths) -> StepServices {
    let queue = Arc::new(LocalJobQueue::new());
    StepServices::new(
        Arc::new(ProcessExecutionEngine::new(queue.clone(), paths.scratch_dir())),
        Arc::new(FileInspectionEngine::new(queue.clone())),
        queue,
        Arc::new(
            WorkspaceRelocator::new(paths.packages_dir()).with_scratch_root(paths.scratch_dir()),
        ),
    )
}
