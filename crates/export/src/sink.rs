//! Client-side saving of downloaded artifacts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use coverage_client::ExportJob;
use coverage_config::constants::{DEFAULT_DOWNLOAD_EXTENSION, DEFAULT_DOWNLOAD_STEM};
use tracing::debug;

/// Destination for downloaded export artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist `bytes` under `filename` and return where they ended up.
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> std::io::Result<PathBuf>;
}

/// Writes artifacts into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        let len = bytes.len();
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = len, "Saved export artifact");
        Ok(path)
    }
}

/// Name to save a job's artifact under.
///
/// Uses the final path component of the name assigned by the API, or
/// `export-{jobId}.bin` when the job carries none.
pub fn artifact_filename(job: &ExportJob) -> String {
    job.filename
        .as_deref()
        .and_then(final_component)
        .unwrap_or_else(|| {
            format!(
                "{}-{}.{}",
                DEFAULT_DOWNLOAD_STEM,
                sanitize(&job.job_id),
                DEFAULT_DOWNLOAD_EXTENSION
            )
        })
}

fn final_component(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    match last {
        "" | "." | ".." => None,
        _ => Some(last.to_string()),
    }
}

fn sanitize(job_id: &str) -> String {
    job_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
