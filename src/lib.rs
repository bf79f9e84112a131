pub mod config;
pub mod fetch;
pub mod logging;
pub mod progress;
pub mod transport;

pub use config::{ArtifactSpec, Config, FetchOptions};
pub use fetch::{DownloadOutcome, FailureReason, FetchError, Fetcher};

pub type Result<T> = anyhow::Result<T>;
