//! Minimal accesslog example: a few JSON endpoints behind the access-log
//! middleware, plus `/metrics` for Prometheus.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42?fields=name
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/users/42
//!   curl http://localhost:3000/health
//!   curl http://localhost:3000/metrics

use std::sync::Arc;

use accesslog::middleware::{AccessLog, HttpMetrics, MetricsConfig};
use accesslog::{Request, Response, Router, Server, TracingLogger};
use http::StatusCode;
use prometheus::{Encoder, Registry, TextEncoder};

#[tokio::main]
async fn main() -> Result<(), accesslog::Error> {
    tracing_subscriber::fmt::init();

    let registry = Registry::new();
    let metrics = Arc::new(HttpMetrics::with_config(&MetricsConfig::new().namespace("demo"))?);
    let access = AccessLog::build(Arc::new(TracingLogger), metrics, &registry)
        .with_path_normalizer(|path| match path.strip_prefix("/users/") {
            Some(_) => "/users/{id}".to_owned(),
            None => path.to_owned(),
        });

    let app = Router::new()
        .get("/users/{id}",    get_user)
        .post("/users",        create_user)
        .delete("/users/{id}", delete_user)
        .get("/health",        health)
        .get("/metrics",       move |_req: Request| {
            let registry = registry.clone();
            async move { render(&registry) }
        });

    Server::bind("0.0.0.0:3000").serve(access.wrap(app)).await
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#)
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn health(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

fn render(registry: &Registry) -> Response {
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    match encoder.encode(&registry.gather(), &mut buf) {
        Ok(()) => Response::builder().bytes("text/plain; version=0.0.4", buf),
        Err(_) => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
