//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body limits, dispatch through
//! the route table, response headers and access logging.

use crate::config::AppState;
use crate::error::DispatchError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Reply, RequestParts};
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// Generic over the body so tests can drive it with `Full<Bytes>` while the
/// server passes `hyper::body::Incoming`.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Display,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let access_log = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(&peer, &parts));

    let mut response = respond(&parts, body, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }
    if parts.method == Method::HEAD {
        response = http::strip_body(response);
    }

    if let Some(mut entry) = access_log {
        let sent = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(response.status().as_u16(), sent, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn respond<B>(parts: &Parts, body: B, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Display,
{
    let max_body_size = state.config.http.max_body_size;

    // 1. Reject oversized bodies before reading them
    if let Some(resp) = check_body_size(&parts.headers, max_body_size) {
        return resp;
    }

    // 2. Read the body, enforcing the limit on what actually arrived
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::build_400_response("Failed to read request body");
        }
    };
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > max_body_size {
        logger::log_warning(&format!(
            "Request body too large: {} bytes (max: {max_body_size})",
            bytes.len()
        ));
        return http::build_413_response(max_body_size);
    }

    // 3. Dispatch
    let request = RequestParts {
        method: &parts.method,
        path: parts.uri.path(),
        query: parts.uri.query(),
        content_type: parts.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        body: &bytes,
    };
    match state.routes.dispatch(&request) {
        Ok(Reply::Json(value)) => http::json_response(StatusCode::OK, &value),
        Ok(Reply::Redirect(location)) => http::build_redirect_response_with_code(&location, 307),
        Err(err) => {
            if let DispatchError::Validation(_) = &err {
                tracing::debug!(error = %err, "request rejected");
            }
            http::build_error_response(&err)
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response(max_body_size))
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
