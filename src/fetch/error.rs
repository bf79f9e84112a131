/// Errors arising while making an artifact available on disk.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The source URL is empty or still the template placeholder.
    #[error("source URL is not set correctly ({url:?})")]
    MisconfiguredSource { url: String },

    /// The artifact name is empty or is not a single plain path component.
    #[error("artifact filename {filename:?} is not a plain file name")]
    InvalidFilename { filename: String },

    /// Something other than a regular file occupies the final path.
    #[error("{path} exists but is not a regular file")]
    NotAFile { path: String },

    /// Connecting or a body read exceeded the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The server answered with a non-2xx status.
    #[error("download failed for {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    /// Connection-level failure, or the body stream broke off.
    #[error("download failed for {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The stream ended cleanly but delivered a different byte count than declared.
    #[error("download incomplete: expected {expected} bytes, received {received}")]
    SizeMismatch { expected: u64, received: u64 },

    /// Local I/O failure (directory creation, staging writes, commit rename).
    #[error("unexpected I/O error: {0}")]
    Unexpected(#[from] std::io::Error),
}

/// Coarse failure classes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    TransportError,
    SizeMismatch,
    UnexpectedError,
    MisconfiguredSource,
}

impl FetchError {
    pub fn reason(&self) -> FailureReason {
        match self {
            FetchError::MisconfiguredSource { .. } | FetchError::InvalidFilename { .. } => {
                FailureReason::MisconfiguredSource
            }
            FetchError::Timeout { .. } => FailureReason::Timeout,
            FetchError::Status { .. } | FetchError::Transport { .. } => {
                FailureReason::TransportError
            }
            FetchError::SizeMismatch { .. } => FailureReason::SizeMismatch,
            FetchError::NotAFile { .. } | FetchError::Unexpected(_) => {
                FailureReason::UnexpectedError
            }
        }
    }
}
