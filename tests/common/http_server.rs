//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers every request with one canned reply and counts connections, so
//! tests can assert whether the network was touched at all.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// What to put in the `Content-Length` header.
#[derive(Debug, Clone, Copy)]
pub enum Declared {
    /// The real body length.
    Exact,
    /// No header; the body ends when the connection closes.
    Missing,
    /// A length that need not match the body.
    Claim(u64),
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: &'static str,
    pub body: Vec<u8>,
    pub declared: Declared,
    /// Send half the body, then go quiet for this long before closing.
    pub stall: Option<Duration>,
}

impl Reply {
    pub fn ok(body: Vec<u8>) -> Self {
        Self { status: "200 OK", body, declared: Declared::Exact, stall: None }
    }
}

pub struct TestServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(reply: Reply) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let reply = Arc::new(reply);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            counter.fetch_add(1, Ordering::SeqCst);
            let reply = Arc::clone(&reply);
            thread::spawn(move || handle(stream, &reply));
        }
    });
    TestServer { url: format!("http://127.0.0.1:{}/model.safetensors", port), hits }
}

/// A URL on a port nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/model.safetensors", port)
}

fn handle(mut stream: TcpStream, reply: &Reply) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }

    let length_header = match reply.declared {
        Declared::Exact => format!("Content-Length: {}\r\n", reply.body.len()),
        Declared::Missing => String::new(),
        Declared::Claim(n) => format!("Content-Length: {}\r\n", n),
    };
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/octet-stream\r\n{}Connection: close\r\n\r\n",
        reply.status, length_header
    );
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }

    match reply.stall {
        Some(pause) => {
            let half = reply.body.len() / 2;
            let _ = stream.write_all(&reply.body[..half]);
            let _ = stream.flush();
            thread::sleep(pause);
        }
        None => {
            let _ = stream.write_all(&reply.body);
            let _ = stream.flush();
        }
    }
}
