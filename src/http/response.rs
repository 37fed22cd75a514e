//! HTTP response building module
//!
//! Every body this service writes is JSON, including errors.

use crate::error::DispatchError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use hyper::{Response, StatusCode};
use serde_json::{json, Value};

const JSON: &str = "application/json";

/// Build a compact JSON response with an explicit `Content-Length`
pub fn json_response(status: StatusCode, value: &Value) -> Response<Full<Bytes>> {
    let body = Bytes::from(value.to_string());

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build the 404/422 response for a failed dispatch
pub fn build_error_response(err: &DispatchError) -> Response<Full<Bytes>> {
    json_response(err.status(), &err.to_body())
}

/// Build redirect response with custom status code (301, 302, 307, 308)
pub fn build_redirect_response_with_code(target: &str, code: u16) -> Response<Full<Bytes>> {
    Response::builder()
        .status(code)
        .header(LOCATION, target)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(&code.to_string(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response(max_body_size: u64) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &json!({ "detail": format!("Request body exceeds {max_body_size} bytes") }),
    )
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    json_response(StatusCode::BAD_REQUEST, &json!({ "detail": message }))
}

/// Drop the body of a response for HEAD, keeping its headers
/// (including `Content-Length`) intact
pub fn strip_body(resp: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let (parts, _) = resp.into_parts();
    Response::from_parts(parts, Full::new(Bytes::new()))
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
