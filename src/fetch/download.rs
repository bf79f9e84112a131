//! Streaming GET into a staging file, verified and committed by rename.

use std::io::{self, Read};
use std::path::Path;

use tracing::{error, info};

use super::staging::StagingFile;
use super::{FetchError, Fetcher};
use crate::config::MAX_CHUNK_SIZE;
use crate::progress::{ProgressHandle, ProgressReporter};
use crate::transport::{self, Transport};

impl<T: Transport, P: ProgressReporter> Fetcher<T, P> {
    /// Download `url` to `destination` via `<destination>.part`.
    ///
    /// Returns the number of bytes committed. On any failure neither the
    /// staging file nor `destination` is left behind.
    pub fn download(
        &self,
        url: &str,
        destination: &Path,
        filename: &str,
    ) -> Result<u64, FetchError> {
        info!(url, "downloading '{}'", filename);
        match self.stream_and_commit(url, destination, filename) {
            Ok(bytes) => {
                info!(bytes, path = %destination.display(), "saved '{}'", filename);
                Ok(bytes)
            }
            Err(err) => {
                error!(reason = ?err.reason(), "error downloading '{}': {}", filename, err);
                Err(err)
            }
        }
    }

    fn stream_and_commit(
        &self,
        url: &str,
        destination: &Path,
        filename: &str,
    ) -> Result<u64, FetchError> {
        let response = self.transport.get(url)?;
        if !(200..300).contains(&response.status) {
            return Err(FetchError::Status { url: url.to_owned(), status: response.status });
        }
        let expected = response.content_length;
        let mut body = response.body;

        // Both guards clean up on drop unless the commit below succeeds.
        let mut staging = StagingFile::create(destination)?;
        let progress = ProgressGuard::new(self.progress.begin(filename, expected));

        let mut chunk = vec![0u8; self.options.chunk_size.clamp(1, MAX_CHUNK_SIZE)];
        let mut received: u64 = 0;
        loop {
            let n = fill_chunk(&mut *body, &mut chunk)
                .map_err(|e| transport::read_error(url, e))?;
            if n == 0 {
                break;
            }
            staging.write_all(&chunk[..n])?;
            received += n as u64;
            progress.advance(n as u64);
        }

        // Unknown length: whatever arrived before a clean end of stream is accepted.
        if let Some(expected) = expected {
            if received != expected {
                return Err(FetchError::SizeMismatch { expected, received });
            }
        }

        staging.commit(destination)?;
        progress.finish();
        Ok(received)
    }
}

/// Read until `buf` is full or the body ends.
fn fill_chunk(body: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match body.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Abandons the progress display on drop unless finished.
struct ProgressGuard<H: ProgressHandle> {
    handle: H,
    finished: bool,
}

impl<H: ProgressHandle> ProgressGuard<H> {
    fn new(handle: H) -> Self {
        Self { handle, finished: false }
    }

    fn advance(&self, delta: u64) {
        self.handle.advance(delta);
    }

    fn finish(mut self) {
        self.handle.finish();
        self.finished = true;
    }
}

impl<H: ProgressHandle> Drop for ProgressGuard<H> {
    fn drop(&mut self) {
        if !self.finished {
            self.handle.abandon();
        }
    }
}
