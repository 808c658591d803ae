use super::queue::LocalJobQueue;
use crate::job::{ArtifactCodec, InspectionEngine, JobHandle, JobStatus, JsonArtifactCodec};
use crate::mediapackage::{Element, ElementType};
use anyhow::{anyhow, Context, Result};
use sha2::Digest;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Probes a local file and reports it as an inspected track.
///
/// Records size, a sha256 checksum, and a mimetype guessed from the
/// extension. Decoding the media stream itself is left to real inspectors.
pub struct FileInspectionEngine {
    queue: Arc<LocalJobQueue>,
    codec: Arc<dyn ArtifactCodec>,
}

impl FileInspectionEngine {
    pub fn new(queue: Arc<LocalJobQueue>) -> Self {
        Self {
            queue,
            codec: Arc::new(JsonArtifactCodec),
        }
    }
}

impl InspectionEngine for FileInspectionEngine {
    fn submit(&self, location: &str) -> Result<JobHandle> {
        let start = Instant::now();
        let probed = probe(Path::new(location));
        let elapsed = start.elapsed();
        match probed {
            Ok(element) => {
                tracing::debug!(
                    location,
                    size = element.size,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "probed file"
                );
                let payload = self.codec.encode(&element)?;
                self.queue
                    .record(JobStatus::Finished, Some(payload), elapsed)
            }
            Err(err) => {
                tracing::warn!(location, error = %format!("{err:#}"), "inspection failed");
                self.queue.record(JobStatus::Failed, None, elapsed)
            }
        }
    }
}

fn probe(path: &Path) -> Result<Element> {
    if !path.is_file() {
        return Err(anyhow!("{} is not a file", path.display()));
    }
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = sha2::Sha256::new();
    let size = io::copy(&mut file, &mut hasher)
        .with_context(|| format!("read {}", path.display()))?;

    let mut element = Element::new(
        Uuid::new_v4().to_string(),
        ElementType::Track,
        path.display().to_string(),
    );
    element.size = Some(size);
    element.checksum = Some(format!("{:x}", hasher.finalize()));
    element.mimetype = guess_mimetype(path).map(str::to_string);
    Ok(element)
}

fn guess_mimetype(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mimetype = match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "m4a" | "aac" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        _ => return None,
    };
    Some(mimetype)
}
