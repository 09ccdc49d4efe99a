//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router is itself a
//! [`Service`], so it can be wrapped by middleware like any other.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::service::{BoxFuture, BoxedService, Service};
use crate::writer::ResponseWriter;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// directly or wrapped in middleware. Registration methods return `self` so
/// they chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedService>>,
}

enum Lookup {
    Found(BoxedService, HashMap<String, String>),
    OtherMethod,
    Missing,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register an async fn handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use accesslog::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler.into_service())
    }

    /// Register any [`Service`], e.g. a single route wrapped in middleware.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Router::on`].
    pub fn mount(self, method: Method, path: &str, service: impl Service) -> Self {
        self.add(method, path, Arc::new(service))
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    fn add(mut self, method: Method, path: &str, service: BoxedService) -> Self {
        // First route for a method creates its tree.
        self.routes
            .entry(method)
            .or_default()
            .insert(path, service)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            // matchit borrows params from the path; copy them so the
            // request can own them.
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }
        // No match for this method. If another method's tree knows the path
        // the answer is 405, otherwise 404.
        let elsewhere = self.routes.iter()
            .any(|(m, tree)| m != method && tree.at(path).is_ok());
        if elsewhere { Lookup::OtherMethod } else { Lookup::Missing }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Service for Router {
    fn call<'a>(&'a self, mut req: Request, writer: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        Box::pin(async move {
            match self.lookup(req.method(), req.uri().path()) {
                Lookup::Found(service, params) => {
                    req.params = params;
                    // The route's service writes straight into our writer;
                    // nothing is buffered at this level.
                    service.call(req, writer).await;
                }
                Lookup::OtherMethod => Response::status(StatusCode::METHOD_NOT_ALLOWED).write_to(writer),
                Lookup::Missing => Response::status(StatusCode::NOT_FOUND).write_to(writer),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{CapturedWriter, get, request};

    async fn user(req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or("?"))
    }

    async fn call(router: &Router, req: Request) -> CapturedWriter {
        let mut w = CapturedWriter::default();
        router.call(req, &mut w).await;
        w
    }

    #[tokio::test]
    async fn dispatches_with_params() {
        let router = Router::new().get("/users/{id}", user);
        let w = call(&router, get("/users/42?full=1")).await;
        assert_eq!(w.sent_status(), Some(StatusCode::OK));
        assert_eq!(w.body, b"user 42");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let router = Router::new().get("/users/{id}", user);
        let w = call(&router, get("/nope")).await;
        assert_eq!(w.sent_status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn known_path_wrong_method_is_405() {
        let router = Router::new().get("/users/{id}", user);
        let w = call(&router, request(Method::DELETE, "/users/1")).await;
        assert_eq!(w.sent_status(), Some(StatusCode::METHOD_NOT_ALLOWED));
    }

    #[tokio::test]
    async fn mounted_service_is_reachable() {
        let inner = Router::new().get("/ping", |_req: Request| async { "pong" });
        let router = Router::new().mount(Method::GET, "/ping", inner);
        let w = call(&router, get("/ping")).await;
        assert_eq!(w.body, b"pong");
    }
}
