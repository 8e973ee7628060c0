//! HTTP observability middleware
//!
//! Implemented as a Tower Layer/Service rather than `from_fn` so it wraps
//! the whole router, including requests rejected by the gates. Combines
//! request ID propagation and request metrics.

use axum::{body::Body, http::Request, response::Response};
use metrics::{counter, gauge, histogram};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

use crate::telemetry::metrics::{
    HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tower Layer for HTTP observability (request ID + metrics).
#[derive(Clone)]
pub struct ObservabilityLayer;

impl<S> Layer<S> for ObservabilityLayer {
    type Service = ObservabilityMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ObservabilityMiddleware { inner }
    }
}

/// Tower Service that records HTTP metrics and propagates request IDs.
#[derive(Clone)]
pub struct ObservabilityMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for ObservabilityMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let method = request.method().to_string();
        let path = normalize_path(request.uri().path());

        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        gauge!(HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
        let start = Instant::now();

        // Take the service that was driven to readiness, leave a fresh clone.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let span = tracing::info_span!("request", request_id = %request_id);

        Box::pin(
            async move {
                let result = inner.call(request).await;
                gauge!(HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);
                let mut response = result?;

                let duration = start.elapsed().as_secs_f64();
                let status = response.status().as_u16().to_string();

                counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "path" => path.clone(), "status" => status)
                    .increment(1);
                histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "path" => path)
                    .record(duration);

                if let Ok(val) = request_id.parse() {
                    response.headers_mut().insert(REQUEST_ID_HEADER, val);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}

/// Collapse caller-chosen path segments to placeholders so metric labels
/// stay low-cardinality.
///
/// `/api/v1/users/{uid}/...` and `/api/v1/collections/{collection}/documents/{id}`
/// carry identifiers chosen by callers or the identity provider.
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let mut normalized: Vec<&str> = Vec::with_capacity(segments.len());

    for seg in segments {
        // Compare against the already normalized segment so a caller-chosen
        // name like `users` is not mistaken for a route keyword.
        let previous = normalized.last().copied().unwrap_or("");
        let replaced = match previous {
            "users" if seg == "email" => seg,
            "users" if !seg.is_empty() => "{uid}",
            "email" if !seg.is_empty() => "{email}",
            "collections" if !seg.is_empty() => "{collection}",
            "documents" if !seg.is_empty() => "{id}",
            _ if looks_like_uuid(seg) => "{id}",
            _ => seg,
        };
        normalized.push(replaced);
    }

    normalized.join("/")
}

fn looks_like_uuid(s: &str) -> bool {
    s.len() == 36 && s.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}
