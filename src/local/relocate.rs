use crate::config::is_path_segment;
use crate::job::Relocator;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Moves element files into `<root>/<namespace>/<element-id>/<filename>`.
#[derive(Debug, Clone)]
pub struct WorkspaceRelocator {
    root: PathBuf,
    scratch_root: Option<PathBuf>,
}

impl WorkspaceRelocator {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            scratch_root: None,
        }
    }

    /// Remove a job directory directly under `scratch_root` once its file
    /// has moved out and it is empty.
    pub fn with_scratch_root(mut self, scratch_root: PathBuf) -> Self {
        self.scratch_root = Some(scratch_root);
        self
    }

    fn prune_job_dir(&self, source: &Path) {
        let Some(scratch_root) = self.scratch_root.as_deref() else {
            return;
        };
        let Some(job_dir) = source
            .parent()
            .filter(|dir| dir.parent() == Some(scratch_root))
        else {
            return;
        };
        if let Err(err) = fs::remove_dir(job_dir) {
            tracing::debug!(dir = %job_dir.display(), error = %err, "job dir kept");
        }
    }
}

impl Relocator for WorkspaceRelocator {
    fn move_to(
        &self,
        location: &str,
        namespace: &str,
        element_id: &str,
        filename: Option<&str>,
    ) -> Result<String> {
        let source = Path::new(location);
        if !source.is_file() {
            return Err(anyhow!("source {} is not a file", source.display()));
        }
        let filename = match filename {
            Some(name) => name,
            None => source
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("source {} has no file name", source.display()))?,
        };
        validate_segment(namespace, "namespace")?;
        validate_segment(element_id, "element id")?;
        validate_segment(filename, "filename")?;

        let dest = self.root.join(namespace).join(element_id).join(filename);
        if dest == source {
            return Ok(dest.display().to_string());
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        if let Err(rename_err) = fs::rename(source, &dest) {
            copy_then_remove(source, &dest)
                .with_context(|| format!("rename failed ({rename_err}), copy fallback failed"))?;
        }
        tracing::debug!(from = %source.display(), to = %dest.display(), "moved element file");
        self.prune_job_dir(source);
        Ok(dest.display().to_string())
    }
}

/// Cross-device fallback: copy to a sibling temp file, rename, drop the source.
fn copy_then_remove(source: &Path, dest: &Path) -> Result<()> {
    let file_name = dest
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("element");
    let tmp_path = dest
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!(".{file_name}.tmp"));
    fs::copy(source, &tmp_path).with_context(|| format!("copy {}", source.display()))?;
    fs::rename(&tmp_path, dest).with_context(|| format!("publish {}", dest.display()))?;
    fs::remove_file(source).with_context(|| format!("remove {}", source.display()))?;
    Ok(())
}

fn validate_segment(segment: &str, label: &str) -> Result<()> {
    if is_path_segment(segment) {
        Ok(())
    } else {
        Err(anyhow!("{label} must be a single path segment (got {segment:?})"))
    }
}
