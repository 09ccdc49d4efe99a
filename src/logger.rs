//! The access-log capability.
//!
//! [`AccessLog`](crate::middleware::AccessLog) hands every completed request
//! to an [`AccessLogger`] and reports its own setup problems through the same
//! object. Where the records end up is the logger's business.

use std::time::Duration;

use http::StatusCode;
use tracing::{error, info, warn};

use crate::request::RequestInfo;

/// Receives one record per completed request.
///
/// Implementations are called on the request's task after the wrapped
/// service has returned, so they should not block for long.
pub trait AccessLogger: Send + Sync + 'static {
    /// Records one completed request.
    fn log_access(&self, req: &RequestInfo, status: StatusCode, elapsed: Duration);

    /// Records an internal failure that did not stop the caller.
    fn log_error(&self, component: &str, operation: &str, err: &dyn std::error::Error);
}

/// Default logger: one `tracing` event per request under the `access` target.
///
/// Server errors (5xx) are logged at `WARN`, everything else at `INFO`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl AccessLogger for TracingLogger {
    fn log_access(&self, req: &RequestInfo, status: StatusCode, elapsed: Duration) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let user_agent = req.user_agent.as_deref().unwrap_or("-");
        if status.is_server_error() {
            warn!(
                target: "access",
                method = %req.method,
                uri = %req.target,
                status = status.as_u16(),
                elapsed_ms,
                remote = ?req.remote_addr,
                user_agent,
                "request failed",
            );
        } else {
            info!(
                target: "access",
                method = %req.method,
                uri = %req.target,
                status = status.as_u16(),
                elapsed_ms,
                remote = ?req.remote_addr,
                user_agent,
                "request completed",
            );
        }
    }

    fn log_error(&self, component: &str, operation: &str, err: &dyn std::error::Error) {
        error!(component, operation, error = %err, "internal error");
    }
}
