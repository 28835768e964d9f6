//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use soap_source::{RemoteCall, Result, SessionHooks, SoapSource};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

pub const WSDL: &str = "https://svc.test/api?wsdl";
pub const LOCATION: &str = "https://svc.test/api";

/// Log output captured from the tracing subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.bytes.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Lines logged at `level` ("ERROR", "DEBUG", ...).
    pub fn at_level(&self, level: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(level))
            .collect()
    }
}

pub struct LogWriter {
    buffer: LogBuffer,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.clone(),
        }
    }
}

/// Capture every event on the current thread until the guard is dropped.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .without_time()
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

/// Hooks counting login/logout invocations.
#[derive(Clone)]
pub struct CountingHooks {
    pub logins: Arc<AtomicUsize>,
    pub logouts: Arc<AtomicUsize>,
    pub login_result: bool,
    pub logout_result: bool,
}

impl CountingHooks {
    pub fn new() -> Self {
        Self {
            logins: Arc::new(AtomicUsize::new(0)),
            logouts: Arc::new(AtomicUsize::new(0)),
            login_result: true,
            logout_result: true,
        }
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionHooks for CountingHooks {
    async fn login(&self, _source: &mut SoapSource) -> Result<bool> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        Ok(self.login_result)
    }

    async fn logout(&self, _source: &mut SoapSource) -> Result<bool> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(self.logout_result)
    }
}

/// Hooks appending an auth token to every call.
pub struct TokenHooks {
    pub token: Value,
}

impl TokenHooks {
    pub fn new(token: &str) -> Self {
        Self { token: json!(token) }
    }
}

#[async_trait]
impl SessionHooks for TokenHooks {
    fn before_call(&self, call: &mut RemoteCall) {
        call.args.push(self.token.clone());
    }
}
