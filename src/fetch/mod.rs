//! Presence check, streamed download and atomic commit of a single artifact.

mod download;
mod error;
pub mod staging;
#[cfg(test)]
mod test_support;

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{error, info};

use crate::config::{ArtifactSpec, FetchOptions, PLACEHOLDER_URL};
use crate::progress::ProgressReporter;
use crate::transport::Transport;

pub use error::{FailureReason, FetchError};

/// Final artifact path, or why it could not be made available.
pub type DownloadOutcome = Result<PathBuf, FetchError>;

/// Makes one artifact present on disk, downloading it through `T` and
/// reporting byte progress through `P` when it is missing.
#[derive(Debug)]
pub struct Fetcher<T, P> {
    transport: T,
    progress: P,
    options: FetchOptions,
}

impl<T: Transport, P: ProgressReporter> Fetcher<T, P> {
    pub fn new(transport: T, progress: P, options: FetchOptions) -> Self {
        Self { transport, progress, options }
    }

    /// Return the artifact's path, downloading it first if it is not on disk.
    ///
    /// An existing file at `directory/filename` is trusted as-is; the
    /// transport is not touched.
    pub fn ensure(&self, spec: &ArtifactSpec) -> DownloadOutcome {
        if !is_plain_filename(&spec.filename) {
            error!(filename = %spec.filename, "artifact filename is not a plain file name");
            return Err(FetchError::InvalidFilename { filename: spec.filename.clone() });
        }
        if let Err(e) = fs::create_dir_all(&spec.directory) {
            error!(dir = %spec.directory.display(), "cannot create target directory: {}", e);
            return Err(e.into());
        }

        let final_path = spec.final_path();
        if final_path.is_file() {
            info!(
                path = %final_path.display(),
                "'{}' already exists, skipping download",
                spec.filename
            );
            return Ok(final_path);
        }
        if final_path.exists() {
            error!(path = %final_path.display(), "final path is occupied by a non-file");
            return Err(FetchError::NotAFile { path: final_path.display().to_string() });
        }
        info!("'{}' not found locally", spec.filename);

        if !source_is_configured(&spec.url) {
            error!(url = %spec.url, "source URL is not set correctly");
            return Err(FetchError::MisconfiguredSource { url: spec.url.clone() });
        }

        self.download(&spec.url, &final_path, &spec.filename)?;
        Ok(final_path)
    }
}

/// False for an empty URL or the unfilled template placeholder.
pub fn source_is_configured(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && url != PLACEHOLDER_URL
}

/// True when `name` is exactly one normal path component (no separators,
/// no `.`/`..`, not empty).
fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.ends_with(['/', '\\'])
}
