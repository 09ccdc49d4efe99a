//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version};

/// An incoming HTTP request with its body fully collected.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) target: String,
    pub(crate) version: Version,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: Option<SocketAddr>,
}

impl Request {
    /// Builds a request from an `http::Request` whose body is already in memory.
    ///
    /// The server uses this after collecting the hyper body; it is public so
    /// services can be driven directly, e.g. from tests.
    pub fn from_http(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        // HTTP/2 requests carry scheme and authority in the URI; only the
        // origin-form target (path and query) is kept.
        let target = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_owned(), |pq| pq.as_str().to_owned());
        Self {
            method: parts.method,
            uri: parts.uri,
            target,
            version: parts.version,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            remote_addr: None,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// The raw request target as received: path plus query string.
    pub fn target(&self) -> &str { &self.target }

    /// The request target with everything from the first `?` removed.
    pub fn path(&self) -> &str { strip_query(&self.target) }

    /// Case-insensitive header lookup. Non-UTF-8 values are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Snapshot of the request line and client metadata, detached from the body.
    pub fn info(&self) -> RequestInfo {
        RequestInfo {
            method: self.method.clone(),
            target: self.target.clone(),
            version: self.version,
            remote_addr: self.remote_addr,
            user_agent: self.header("user-agent").map(str::to_owned),
            referer: self.header("referer").map(str::to_owned),
        }
    }
}

/// The request descriptor handed to an [`AccessLogger`](crate::AccessLogger).
///
/// Captured before the request is moved into the wrapped service, so it is
/// still available once the service has returned.
#[derive(Clone, Debug)]
pub struct RequestInfo {
    pub method: Method,
    pub target: String,
    pub version: Version,
    pub remote_addr: Option<SocketAddr>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl RequestInfo {
    /// Same derivation as [`Request::path`].
    pub fn path(&self) -> &str { strip_query(&self.target) }
}

pub(crate) fn strip_query(target: &str) -> &str {
    match target.find('?') {
        Some(i) => &target[..i],
        None => target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(target: &str) -> Request {
        Request::from_http(http::Request::get(target).body(Bytes::new()).unwrap())
    }

    #[test]
    fn path_drops_query_string() {
        let req = get("/a/b?x=1&y=2");
        assert_eq!(req.target(), "/a/b?x=1&y=2");
        assert_eq!(req.path(), "/a/b");
    }

    #[test]
    fn path_without_query_is_whole_target() {
        assert_eq!(get("/health").path(), "/health");
    }

    #[test]
    fn absolute_form_uri_keeps_only_path_and_query() {
        let req = get("http://127.0.0.1:8080/health?x=1");
        assert_eq!(req.target(), "/health?x=1");
        assert_eq!(req.path(), "/health");
        assert_eq!(req.info().target, "/health?x=1");
    }

    #[test]
    fn strip_query_cuts_at_first_question_mark() {
        assert_eq!(strip_query("/q?a=?b"), "/q");
        assert_eq!(strip_query("/q?"), "/q");
    }

    #[test]
    fn info_carries_client_headers() {
        let req = Request::from_http(
            http::Request::post("/users?draft=1")
                .header("user-agent", "curl/8.0")
                .body(Bytes::from_static(b"{}"))
                .unwrap(),
        );
        let info = req.info();
        assert_eq!(info.method, Method::POST);
        assert_eq!(info.target, "/users?draft=1");
        assert_eq!(info.path(), "/users");
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.0"));
        assert!(info.referer.is_none());
    }
}
