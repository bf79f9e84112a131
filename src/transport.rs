//! HTTP transport: issues the GET and hands back status, declared length and
//! a blocking body reader.
//!
//! The [`Transport`] trait lets tests stand in for the network.

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Read};

use crate::config::FetchOptions;
use crate::fetch::FetchError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// An opened response whose body has not been read yet.
pub struct TransportResponse {
    pub status: u16,
    /// `Content-Length`, when the server declared one.
    pub content_length: Option<u64>,
    pub body: Box<dyn Read + Send>,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Open a streaming GET for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`] or [`FetchError::Transport`] when no
    /// response could be obtained. A non-2xx status is not an error here.
    fn get(&self, url: &str) -> Result<TransportResponse, FetchError>;
}

/// Blocking HTTP transport on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(options: &FetchOptions) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(options.timeout)
            .timeout(options.timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| map_reqwest_error(url, &e))?;
        Ok(TransportResponse {
            status: response.status().as_u16(),
            content_length: response.content_length(),
            body: Box::new(response),
        })
    }
}

fn map_reqwest_error(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout { url: url.to_owned() }
    } else {
        FetchError::Transport { url: url.to_owned(), reason: error_chain(err) }
    }
}

/// Classify an error raised while reading a response body.
pub fn read_error(url: &str, err: io::Error) -> FetchError {
    if is_timeout(&err) {
        FetchError::Timeout { url: url.to_owned() }
    } else {
        FetchError::Transport { url: url.to_owned(), reason: error_chain(&err) }
    }
}

// reqwest surfaces body timeouts as `io::ErrorKind::Other` wrapping its own error.
fn is_timeout(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::TimedOut {
        return true;
    }
    let mut source: Option<&(dyn StdError + 'static)> =
        err.get_ref().map(|e| e as &(dyn StdError + 'static));
    while let Some(e) = source {
        if let Some(re) = e.downcast_ref::<reqwest::Error>() {
            if re.is_timeout() {
                return true;
            }
        }
        if let Some(io) = e.downcast_ref::<io::Error>() {
            if io.kind() == io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = e.source();
    }
    false
}

/// Render an error with its sources, `outer: inner: root`.
fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        let msg = e.to_string();
        if !out.ends_with(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        source = e.source();
    }
    out
}
