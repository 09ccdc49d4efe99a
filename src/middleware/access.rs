//! Access logging and request metrics around any [`Service`].

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::StatusCode;
use prometheus::Registry;
use tracing::{error, warn};

use crate::logger::AccessLogger;
use crate::middleware::metrics::{HttpMetrics, TimingLabel};
use crate::middleware::recorder::StatusRecorder;
use crate::request::{Request, RequestInfo};
use crate::service::{BoxFuture, Service};
use crate::writer::ResponseWriter;

type PathNormalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Times every request, captures its final status, then increments the
/// request counter, observes the latency histogram and writes one access-log
/// record.
///
/// Build it once per application; [`wrap`](Self::wrap) as many services as
/// needed. Instances built against the same [`HttpMetrics`] share series.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use accesslog::middleware::{AccessLog, HttpMetrics};
/// use accesslog::{Request, Router, Server, TracingLogger};
///
/// # async fn run() -> Result<(), accesslog::Error> {
/// let registry = prometheus::Registry::new();
/// let metrics = Arc::new(HttpMetrics::new()?);
/// let access = AccessLog::build(Arc::new(TracingLogger), metrics, &registry);
///
/// let app = Router::new().get("/health", |_req: Request| async { "ok" });
/// Server::bind("0.0.0.0:3000").serve(access.wrap(app)).await
/// # }
/// ```
#[derive(Clone)]
pub struct AccessLog {
    logger: Arc<dyn AccessLogger>,
    metrics: Arc<HttpMetrics>,
    normalize: Option<PathNormalizer>,
}

impl AccessLog {
    /// Registers the metric families with `registry` and returns the middleware.
    ///
    /// A family that cannot be registered (typically because it already is)
    /// is reported through `logger.log_error` and otherwise ignored: the
    /// middleware keeps recording into `metrics`.
    pub fn build(logger: Arc<dyn AccessLogger>, metrics: Arc<HttpMetrics>, registry: &Registry) -> Self {
        for err in metrics.register(registry) {
            logger.log_error("middleware", "AccessLog::build", &err);
        }
        Self { logger, metrics, normalize: None }
    }

    /// Maps the query-less request path to the value stored in the `path`
    /// label, e.g. `/users/42` to `/users/{id}`. Without one the raw path is
    /// used and every distinct path becomes a new series.
    pub fn with_path_normalizer(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.normalize = Some(Arc::new(f));
        self
    }

    /// The families this instance records into.
    pub fn metrics(&self) -> &HttpMetrics {
        &self.metrics
    }

    /// Wraps `inner`. The result serves exactly what `inner` serves.
    pub fn wrap<S: Service>(&self, inner: S) -> Instrumented<S> {
        Instrumented { inner, access: self.clone() }
    }

    fn emit(&self, req: &RequestInfo, status: StatusCode, elapsed: Duration) {
        let path = match &self.normalize {
            Some(normalize) => Cow::Owned(normalize(req.path())),
            None => Cow::Borrowed(req.path()),
        };

        if let Err(e) = self.metrics.record_hit(status, &path, &req.method) {
            warn!(error = %e, "failed to count request");
        }

        let timing = match self.metrics.timing_label() {
            TimingLabel::Target => req.target.as_str(),
            TimingLabel::Path => &*path,
            TimingLabel::Method => req.method.as_str(),
        };
        if let Err(e) = self.metrics.observe_timing(timing, elapsed.as_secs_f64()) {
            warn!(error = %e, "failed to observe request duration");
        }

        self.logger.log_access(req, status, elapsed);
    }
}

/// A [`Service`] wrapped by [`AccessLog::wrap`].
pub struct Instrumented<S> {
    inner: S,
    access: AccessLog,
}

impl<S: Service> Service for Instrumented<S> {
    fn call<'a>(&'a self, req: Request, writer: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        Box::pin(async move {
            let start = Instant::now();
            let info = req.info();
            let mut recorder = StatusRecorder::new(writer);

            // A panic or cancellation here skips everything below: no
            // partial telemetry for a request that never finished.
            self.inner.call(req, &mut recorder).await;

            let elapsed = start.elapsed();
            let status = recorder.status();

            let emitted = panic::catch_unwind(AssertUnwindSafe(|| {
                self.access.emit(&info, status, elapsed);
            }));
            if emitted.is_err() {
                error!(uri = %info.target, status = status.as_u16(), "access telemetry panicked");
            }
        })
    }
}
