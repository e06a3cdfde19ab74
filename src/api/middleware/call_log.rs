//! API call capture middleware
//!
//! Records every in-scope request/response pair to the call log sink.
//! The request body is buffered so the downstream handler still sees it,
//! the response body stream is drained to capture it, and a new response
//! carrying the buffered bytes is handed back to the client. Status,
//! headers and body bytes reach the client exactly as the handler
//! produced them; logging is a side effect only.

use std::time::Instant;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use bytes::Bytes;
use chrono::Utc;
use http_body_util::BodyExt;
use tracing::{info, warn};

use crate::api::server::AppState;
use crate::models::ApiCallLog;

/// Path prefixes subject to call logging
const LOGGED_PREFIXES: &[&str] = &["/users", "/tasks", "/energy", "/api"];

const REQUEST_READ_PLACEHOLDER: &str = "[Could not read request body]";
const RESPONSE_DECODE_PLACEHOLDER: &str = "[Could not decode response body]";

/// Outcome of decoding a captured body for the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedBody {
    /// Valid JSON, re-serialized with 2-space indentation
    Json(String),
    /// Plain text; invalid UTF-8 sequences replaced with U+FFFD
    Text(String),
    /// The body could not be captured at all
    Unreadable,
}

impl DecodedBody {
    fn into_log_text(self, placeholder: &str) -> String {
        match self {
            DecodedBody::Json(text) | DecodedBody::Text(text) => text,
            DecodedBody::Unreadable => placeholder.to_string(),
        }
    }
}

/// Decode captured bytes for log readability
///
/// JSON bodies are pretty-printed; anything else is decoded as text,
/// lossily if needed. Never fails.
pub(crate) fn decode_body(bytes: &[u8]) -> DecodedBody {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) {
        if let Ok(pretty) = serde_json::to_string_pretty(&value) {
            return DecodedBody::Json(pretty);
        }
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => DecodedBody::Text(text.to_string()),
        Err(_) => DecodedBody::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Whether a request path is in scope for call logging
fn is_logged_path(path: &str) -> bool {
    LOGGED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Best-effort full URL for the log (axum URIs usually carry only
/// path and query, so the scheme and host are rebuilt from the Host header)
fn full_url(req: &Request) -> String {
    let uri = req.uri();
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    match req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
    {
        Some(host) => format!("http://{}{}", host, uri),
        None => uri.to_string(),
    }
}

/// Capture middleware entry point
///
/// Out-of-scope paths pass through untouched. For in-scope paths the flow
/// is strictly: read request body, invoke handler (timed), drain response
/// body, write log entry, return the reconstructed response.
pub async fn log_api_call(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !is_logged_path(&path) {
        return next.run(req).await;
    }

    let method = req.method().clone();
    let url = full_url(&req);

    // Buffer the request body; the handler gets an identical copy.
    let (parts, body) = req.into_parts();
    let (request_bytes, request_decoded) = match body.collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            let decoded = decode_body(&bytes);
            (bytes, decoded)
        }
        Err(err) => {
            warn!("Failed to read request body for {} {}: {}", method, path, err);
            (Bytes::new(), DecodedBody::Unreadable)
        }
    };
    let req = Request::from_parts(parts, Body::from(request_bytes.clone()));

    // Timer covers the handler only, not the logging that follows.
    let start = Instant::now();
    let response = next.run(req).await;
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    // Drain the response stream; chunks concatenate in arrival order.
    let (parts, body) = response.into_parts();
    let response_bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            // Aborted mid-stream: nothing to log, nothing left to deliver.
            warn!("Response body for {} {} ended early: {}", method, path, err);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let request_body = match request_decoded {
        DecodedBody::Unreadable => Some(REQUEST_READ_PLACEHOLDER.to_string()),
        _ if request_bytes.is_empty() => None,
        decoded => Some(decoded.into_log_text(REQUEST_READ_PLACEHOLDER)),
    };

    let entry = ApiCallLog {
        timestamp: Utc::now(),
        method: method.to_string(),
        path,
        url,
        status: parts.status.as_u16(),
        duration_ms,
        request_body,
        response_body: decode_body(&response_bytes).into_log_text(RESPONSE_DECODE_PLACEHOLDER),
    };

    // A sink failure degrades logging only, never the response.
    if let Err(err) = state.call_sink.append(&entry).await {
        warn!("Failed to append call log entry: {}", err);
    }

    info!(
        "Logged: {} {} [{}] ({:.2}ms)",
        entry.method, entry.path, entry.status, entry.duration_ms
    );

    Response::from_parts(parts, Body::from(response_bytes))
}
