//! Fakes shared by the fetch unit tests.

use std::io::{self, Read};
use std::sync::{Arc, Mutex};

use super::Fetcher;
use crate::config::FetchOptions;
use crate::progress::{ProgressHandle, ProgressReporter};
use crate::transport::{MockTransport, TransportResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Begin(Option<u64>),
    Advance(u64),
    Finish,
    Abandon,
}

/// Reporter that records every call in order.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingReporter {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for RecordingReporter {
    type Handle = RecordingReporter;

    fn begin(&self, _label: &str, total: Option<u64>) -> RecordingReporter {
        self.push(Event::Begin(total));
        self.clone()
    }
}

impl ProgressHandle for RecordingReporter {
    fn advance(&self, delta: u64) {
        self.push(Event::Advance(delta));
    }

    fn finish(&self) {
        self.push(Event::Finish);
    }

    fn abandon(&self) {
        self.push(Event::Abandon);
    }
}

pub(crate) fn response(
    status: u16,
    content_length: Option<u64>,
    body: impl Read + Send + 'static,
) -> TransportResponse {
    TransportResponse { status, content_length, body: Box::new(body) }
}

pub(crate) fn fetcher(
    transport: MockTransport,
) -> (Fetcher<MockTransport, RecordingReporter>, RecordingReporter) {
    fetcher_with(transport, FetchOptions::default())
}

pub(crate) fn fetcher_with(
    transport: MockTransport,
    options: FetchOptions,
) -> (Fetcher<MockTransport, RecordingReporter>, RecordingReporter) {
    let progress = RecordingReporter::default();
    (Fetcher::new(transport, progress.clone(), options), progress)
}

/// Body that hands out at most `step` bytes per read.
pub(crate) struct Trickle {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl Trickle {
    pub(crate) fn new(data: Vec<u8>, step: usize) -> Self {
        Self { data, pos: 0, step }
    }
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Body that yields `data` and then fails with `kind` instead of ending.
pub(crate) struct BreaksOff {
    data: io::Cursor<Vec<u8>>,
    kind: io::ErrorKind,
}

impl BreaksOff {
    pub(crate) fn new(data: Vec<u8>, kind: io::ErrorKind) -> Self {
        Self { data: io::Cursor::new(data), kind }
    }
}

impl Read for BreaksOff {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::new(self.kind, "stream broke off")),
            n => Ok(n),
        }
    }
}
