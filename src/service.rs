//! The service contract shared by routers, handlers and middleware.
//!
//! ```text
//! Server ── Request + &mut HttpWriter ──▶ Instrumented<Router>
//!                                          │ StatusRecorder(&mut HttpWriter)
//!                                          ▼
//!                                        Router ──▶ route service ──▶ writes
//! ```
//!
//! Every layer has the same shape, so layers compose in any order and any
//! number of times.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::writer::ResponseWriter;

/// A heap-allocated, type-erased future borrowing the service and the writer
/// for the duration of one request.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Handles one request by writing a response into `writer`.
///
/// The future completes once the service has written everything it is going
/// to write. Implement this directly for services that stream, or that need
/// to see the writer (middleware); plain `async fn` handlers get it through
/// [`Handler`](crate::Handler).
pub trait Service: Send + Sync + 'static {
    fn call<'a>(&'a self, req: Request, writer: &'a mut dyn ResponseWriter) -> BoxFuture<'a>;
}

/// A shared, type-erased service. One atomic increment per request to clone.
pub type BoxedService = Arc<dyn Service>;

impl<S: Service + ?Sized> Service for Arc<S> {
    fn call<'a>(&'a self, req: Request, writer: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        (**self).call(req, writer)
    }
}

impl<S: Service + ?Sized> Service for Box<S> {
    fn call<'a>(&'a self, req: Request, writer: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        (**self).call(req, writer)
    }
}
