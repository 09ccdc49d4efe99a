//! Middleware layer.
//!
//! Middleware is a [`Service`](crate::Service) that owns another service and
//! hands it the request together with a decorated
//! [`ResponseWriter`](crate::ResponseWriter). That is the right place for
//! cross-cutting concerns that must not change what the client receives.
//!
//! - [`AccessLog`] times each request, captures its final status with a
//!   [`StatusRecorder`], and emits a request counter, a latency histogram
//!   and one access-log record.

mod access;
mod metrics;
mod recorder;

pub use access::{AccessLog, Instrumented};
pub use metrics::{HttpMetrics, MetricsConfig, TimingLabel};
pub use recorder::StatusRecorder;
