use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Result;

/// Artifact fetched when neither a config file nor a flag names one.
pub const DEFAULT_URL: &str =
    "https://files.riqgarden.pp.ua/api/public/dl/aACU3P1n/Downloads/best_model_blg.safetensors";
pub const DEFAULT_FILENAME: &str = "best_model_blg.safetensors";

/// Sentinel left in templates that were never filled in with a real URL.
pub const PLACEHOLDER_URL: &str = "YOUR_ACTUAL_MODEL_DOWNLOAD_URL_HERE";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;
/// Largest read buffer a config file may ask for.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// On-disk configuration (TOML). Every field is optional and falls back to
/// the built-in defaults above.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub url: Option<String>,
    pub filename: Option<String>,
    pub directory: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub chunk_size: Option<usize>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Config =
            toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
        if let Some(n) = cfg.chunk_size {
            if n > MAX_CHUNK_SIZE {
                anyhow::bail!(
                    "{}: chunk_size {} exceeds the maximum of {} bytes",
                    path.display(),
                    n,
                    MAX_CHUNK_SIZE
                );
            }
        }
        Ok(cfg)
    }

    /// Resolve the artifact to fetch. A missing directory means the process's
    /// current working directory.
    pub fn artifact(&self) -> Result<ArtifactSpec> {
        let directory = match &self.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("resolving current directory")?,
        };
        Ok(ArtifactSpec {
            url: self.url.clone().unwrap_or_else(|| DEFAULT_URL.to_string()),
            filename: self
                .filename
                .clone()
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            directory,
        })
    }

    pub fn options(&self) -> FetchOptions {
        FetchOptions {
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            chunk_size: self
                .chunk_size
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_CHUNK_SIZE)
                .min(MAX_CHUNK_SIZE),
        }
    }
}

/// What to fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub url: String,
    pub filename: String,
    pub directory: PathBuf,
}

impl ArtifactSpec {
    pub fn new(
        url: impl Into<String>,
        filename: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self { url: url.into(), filename: filename.into(), directory: directory.into() }
    }

    pub fn final_path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Transfer tuning shared by the transport and the streaming loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Connect timeout, and the longest a single body read may block.
    pub timeout: Duration,
    pub chunk_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self { timeout: DEFAULT_TIMEOUT, chunk_size: DEFAULT_CHUNK_SIZE }
    }
}
