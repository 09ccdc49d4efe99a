//! Handler trait: plain async functions as services.
//!
//! Route handlers are written as
//!
//! ```text
//! async fn name(req: Request) -> impl IntoResponse
//! ```
//!
//! and never see a [`ResponseWriter`]. [`Handler::into_service`] adapts one
//! into a [`Service`] that awaits the function and writes the resulting
//! [`Response`](crate::Response) in one go:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }
//!        ↓ router.on(Method::GET, "/", hello)
//! Arc::new(FnHandler(hello))              ← BoxedService
//!        ↓ at request time
//! hello(req).await.into_response().write_to(writer)
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::request::Request;
use crate::response::IntoResponse;
use crate::service::{BoxFuture, BoxedService, Service};
use crate::writer::ResponseWriter;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. The trait is **sealed**: only the
/// blanket impl for `Fn(Request) -> impl Future<Output = impl IntoResponse>`
/// satisfies it. Anything else that wants to serve a route implements
/// [`Service`] and is registered with [`Router::mount`](crate::Router::mount).
pub trait Handler: private::Sealed + Send + Sync + 'static {
    fn into_service(self) -> BoxedService;
}

// Public trait in a private module: nameable as a bound, impossible to
// implement outside the crate.
mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_service(self) -> BoxedService {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> Service for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call<'a>(&'a self, req: Request, writer: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        // Calling the function yields its concrete `Fut`; the async block
        // turns the output into a response, writes it, and is boxed so the
        // return type matches the trait's `BoxFuture`.
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response().write_to(writer) })
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::test_util::{CapturedWriter, get};

    async fn created(_req: Request) -> (StatusCode, &'static str) {
        (StatusCode::CREATED, "made")
    }

    #[tokio::test]
    async fn fn_handler_writes_its_response() {
        let svc = created.into_service();
        let mut w = CapturedWriter::default();
        svc.call(get("/"), &mut w).await;

        assert_eq!(w.sent_status(), Some(StatusCode::CREATED));
        assert_eq!(w.body, b"made");
    }
}
