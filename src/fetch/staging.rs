//! Staging file lifecycle: bytes land in `<final>.part` and only reach the
//! final name through a rename. Dropping an uncommitted staging file removes it.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const STAGING_SUFFIX: &str = ".part";

/// Path of the staging file for `final_path` (`model.bin` → `model.bin.part`).
pub fn staging_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(STAGING_SUFFIX);
    PathBuf::from(o)
}

pub(crate) struct StagingFile {
    path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl StagingFile {
    /// Create (or truncate a stale) staging file next to `final_path`.
    pub(crate) fn create(final_path: &Path) -> io::Result<Self> {
        let path = staging_path(final_path);
        let file = File::create(&path)?;
        tracing::debug!(path = %path.display(), "staging file opened");
        Ok(Self { path, file: Some(file), committed: false })
    }

    pub(crate) fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.write_all(buf),
            None => Err(io::Error::other("staging file already closed")),
        }
    }

    /// Flush to disk, close, and rename onto `final_path`.
    pub(crate) fn commit(mut self, final_path: &Path) -> io::Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        fs::rename(&self.path, final_path)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Close before removing; Windows refuses to delete open files.
        self.file.take();
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "staging file removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "could not remove staging file: {}", e)
            }
        }
    }
}
