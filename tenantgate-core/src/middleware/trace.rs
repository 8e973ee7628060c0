//! TraceLayer span maker that redacts credentials from logged URIs.
//!
//! Secrets normally travel in headers, but clients sometimes put them in the
//! query string; their values must never reach the logs.

use axum::http::Request;
use tower_http::trace::MakeSpan;
use tracing::Span;

/// Query parameter names whose values are redacted.
const SENSITIVE_PARAMS: &[&str] = &[
    "api_key",
    "session_id",
    "otp",
    "password",
    "token",
    "page_token",
];

#[derive(Clone, Debug)]
pub struct SanitizedMakeSpan;

impl<B> MakeSpan<B> for SanitizedMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http",
            method = %request.method(),
            uri = %sanitize_uri(request.uri()),
            version = ?request.version(),
        )
    }
}

/// Replace the values of sensitive query parameters with `[REDACTED]`.
fn sanitize_uri(uri: &axum::http::Uri) -> String {
    let query = match uri.query() {
        Some(q) => q,
        None => return uri.path().to_string(),
    };

    let sanitized: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SENSITIVE_PARAMS.contains(&key.to_ascii_lowercase().as_str()) => {
                format!("{key}=[REDACTED]")
            }
            _ => pair.to_string(),
        })
        .collect();

    format!("{}?{}", uri.path(), sanitized.join("&"))
}
