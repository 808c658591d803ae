//! Runs the configured executable as a local process.
//!
//! Parameters are split with shell quoting rules and may reference the
//! package through placeholders:
//!
//! - `#{id}`: the media package identifier
//! - `#{out}`: scratch path of the output file (named by `output-filename`)
//! - `#{in}`: first element matching `source-flavor` and `source-tags`
//! - `#{flavor(type/subtype)}`: first element with that flavor and `source-tags`
//!
//! A zero exit status with an output file on disk yields an element payload;
//! a zero exit status without one yields an empty payload. The per-job scratch
//! directory is removed unless it holds an output file.
use super::queue::LocalJobQueue;
use crate::config::split_params;
use crate::job::{ArtifactCodec, ExecuteRequest, ExecutionEngine, JobHandle, JobStatus, JsonArtifactCodec};
use crate::mediapackage::{Element, ElementType, Flavor};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const DEFAULT_OUTPUT_FILENAME: &str = "output";

pub struct ProcessExecutionEngine {
    queue: Arc<LocalJobQueue>,
    scratch_root: PathBuf,
    codec: Arc<dyn ArtifactCodec>,
}

impl ProcessExecutionEngine {
    pub fn new(queue: Arc<LocalJobQueue>, scratch_root: PathBuf) -> Self {
        Self {
            queue,
            scratch_root,
            codec: Arc::new(JsonArtifactCodec),
        }
    }
}

impl ExecutionEngine for ProcessExecutionEngine {
    fn submit(&self, request: &ExecuteRequest<'_>) -> Result<JobHandle> {
        let program = which::which(request.exec)
            .with_context(|| format!("resolve executable {}", request.exec))?;

        let element_id = Uuid::new_v4().to_string();
        let job_dir = self.scratch_root.join(&element_id);
        let output_path =
            job_dir.join(request.output_filename.unwrap_or(DEFAULT_OUTPUT_FILENAME));
        let args = expand_args(request, &output_path)?;
        fs::create_dir_all(&job_dir).with_context(|| format!("create {}", job_dir.display()))?;

        let start = Instant::now();
        let output = Command::new(&program)
            .args(&args)
            .current_dir(&job_dir)
            .output();
        let elapsed = start.elapsed();

        let output = match output {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(program = %program.display(), error = %err, "spawn failed");
                discard_job_dir(&job_dir);
                return self.queue.record(JobStatus::Failed, None, elapsed);
            }
        };

        tracing::info!(
            program = %program.display(),
            elapsed_ms = elapsed.as_millis() as u64,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "execute command complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr_line = stderr.trim().lines().next().unwrap_or_default();
            tracing::warn!(status = %output.status, stderr = stderr_line, "execute command failed");
            discard_job_dir(&job_dir);
            return self.queue.record(JobStatus::Failed, None, elapsed);
        }

        if !output_path.is_file() {
            discard_job_dir(&job_dir);
            return self.queue.record(JobStatus::Finished, None, elapsed);
        }

        let element = Element::new(
            element_id,
            request.expected_type.unwrap_or(ElementType::Other),
            output_path.display().to_string(),
        );
        let payload = self.codec.encode(&element)?;
        self.queue
            .record(JobStatus::Finished, Some(payload), elapsed)
    }
}

/// Split `params` and resolve every placeholder in the resulting arguments.
fn expand_args(request: &ExecuteRequest<'_>, output_path: &Path) -> Result<Vec<String>> {
    let raw_args = match request.params {
        Some(params) => split_params(params).context("split params")?,
        None => Vec::new(),
    };
    let placeholders = Placeholders {
        request,
        output_path,
    };
    raw_args
        .iter()
        .map(|arg| substitute(arg, &placeholders))
        .collect()
}

/// Jobs that produced nothing keep no scratch directory.
fn discard_job_dir(job_dir: &Path) {
    if let Err(err) = fs::remove_dir_all(job_dir) {
        tracing::debug!(dir = %job_dir.display(), error = %err, "scratch cleanup failed");
    }
}

struct Placeholders<'a> {
    request: &'a ExecuteRequest<'a>,
    output_path: &'a Path,
}

impl Placeholders<'_> {
    fn resolve(&self, key: &str) -> Result<String> {
        match key {
            "id" => Ok(self.request.package.id.clone()),
            "out" => Ok(self.output_path.display().to_string()),
            "in" => self.select(self.request.source_flavor),
            _ => {
                let inner = key
                    .strip_prefix("flavor(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| anyhow!("unknown placeholder #{{{key}}}"))?;
                let flavor: Flavor = inner
                    .parse()
                    .with_context(|| format!("placeholder #{{{key}}}"))?;
                self.select(Some(&flavor))
            }
        }
    }

    fn select(&self, flavor: Option<&Flavor>) -> Result<String> {
        let package = self.request.package;
        let tagged: Vec<&Element> = package.elements_with_tags(self.request.source_tags).collect();
        let found = match flavor {
            Some(pattern) => package
                .elements_with_flavor(pattern)
                .find(|element| tagged.contains(element)),
            None => tagged.first().copied(),
        };
        found
            .map(|element| element.location.clone())
            .ok_or_else(|| match flavor {
                Some(pattern) => anyhow!("no input element with flavor {pattern}"),
                None => anyhow!("no input element matches the source tags"),
            })
    }
}

fn substitute(arg: &str, placeholders: &Placeholders<'_>) -> Result<String> {
    let mut resolved = String::with_capacity(arg.len());
    let mut rest = arg;
    while let Some(start) = rest.find("#{") {
        resolved.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| anyhow!("unterminated placeholder in {arg:?}"))?;
        resolved.push_str(&placeholders.resolve(&after[..end])?);
        rest = &after[end + 1..];
    }
    resolved.push_str(rest);
    Ok(resolved)
}
