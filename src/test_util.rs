//! Shared fixtures for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Method, StatusCode};

use crate::logger::AccessLogger;
use crate::request::{Request, RequestInfo};
use crate::writer::ResponseWriter;

pub(crate) fn request(method: Method, target: &str) -> Request {
    Request::from_http(
        http::Request::builder().method(method).uri(target).body(Bytes::new()).unwrap(),
    )
}

pub(crate) fn get(target: &str) -> Request {
    request(Method::GET, target)
}

/// In-memory writer with the usual head semantics: the status is fixed by the
/// first body write, defaulting to 200.
#[derive(Default)]
pub(crate) struct CapturedWriter {
    pub statuses: Vec<StatusCode>,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Vec<u8>,
    sent: Option<StatusCode>,
}

impl CapturedWriter {
    /// The status a client would have seen, if the head went out.
    pub fn sent_status(&self) -> Option<StatusCode> {
        self.sent.or_else(|| self.statuses.last().copied())
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v.to_str().unwrap())
            .collect()
    }
}

impl ResponseWriter for CapturedWriter {
    fn write_status(&mut self, status: StatusCode) {
        self.statuses.push(status);
    }

    fn write_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.push((name, value));
    }

    fn write_body(&mut self, chunk: &[u8]) {
        if self.sent.is_none() {
            self.sent = Some(self.statuses.last().copied().unwrap_or(StatusCode::OK));
        }
        self.body.extend_from_slice(chunk);
    }
}

pub(crate) struct AccessCall {
    pub info: RequestInfo,
    pub status: StatusCode,
    pub elapsed: Duration,
}

#[derive(Default)]
pub(crate) struct RecordingLogger {
    pub access: Mutex<Vec<AccessCall>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn access_count(&self) -> usize {
        self.access.lock().unwrap().len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl AccessLogger for RecordingLogger {
    fn log_access(&self, req: &RequestInfo, status: StatusCode, elapsed: Duration) {
        self.access.lock().unwrap().push(AccessCall { info: req.clone(), status, elapsed });
    }

    fn log_error(&self, component: &str, operation: &str, err: &dyn std::error::Error) {
        self.errors.lock().unwrap().push(format!("{component}: {operation}: {err}"));
    }
}
