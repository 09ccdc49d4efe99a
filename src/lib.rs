//! # accesslog
//!
//! Access logging and Prometheus request metrics for HTTP services, with
//! the small hyper-based server and router needed to host them.
//!
//! ## The contract
//!
//! Wrap any [`Service`] in [`middleware::AccessLog`] and every request it
//! serves produces, once the service has returned:
//!
//! - `hits{status, path, method}` incremented by one (path without query)
//! - `method_timings{target}` observing the elapsed seconds (full target)
//! - one [`AccessLogger::log_access`] call with the request, final status
//!   and elapsed time
//!
//! The wrapped service sees the same request and the client the same
//! response, byte for byte, as without the middleware. Telemetry failures
//! are logged and swallowed; a request whose service panics or is cancelled
//! emits nothing.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use accesslog::middleware::{AccessLog, HttpMetrics};
//! use accesslog::{Request, Response, Router, Server, TracingLogger};
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), accesslog::Error> {
//!     let registry = prometheus::Registry::new();
//!     let metrics = Arc::new(HttpMetrics::new()?);
//!     let access = AccessLog::build(Arc::new(TracingLogger), metrics, &registry);
//!
//!     let app = Router::new()
//!         .get("/users/{id}", get_user)
//!         .get("/health", health);
//!
//!     Server::bind("0.0.0.0:3000").serve(access.wrap(app)).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn health(_req: Request) -> StatusCode {
//!     StatusCode::NO_CONTENT
//! }
//! ```

mod error;
mod handler;
mod logger;
mod request;
mod response;
mod router;
mod server;
mod service;
mod writer;

pub mod middleware;

#[cfg(test)]
mod test_util;

pub use error::Error;
pub use handler::Handler;
pub use logger::{AccessLogger, TracingLogger};
pub use request::{Request, RequestInfo};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use service::{BoxFuture, BoxedService, Service};
pub use writer::ResponseWriter;
