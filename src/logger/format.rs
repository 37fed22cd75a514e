//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variables`

use chrono::{DateTime, Local};
use hyper::http::request::Parts;
use hyper::header::{REFERER, USER_AGENT};
use std::net::SocketAddr;
use std::time::Duration;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Custom format variables, longest first so `$request` never shadows
/// `$request_time` or `$request_uri`
const VARIABLES: &[&str] = &[
    "$body_bytes_sent",
    "$http_user_agent",
    "$request_method",
    "$http_referer",
    "$request_time",
    "$time_iso8601",
    "$remote_addr",
    "$request_uri",
    "$time_local",
    "$request",
    "$status",
];

/// One served request, filled in as the request is handled
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    /// Raw request path
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    pub status: u16,
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Start an entry from the request head, stamped with the current time
    pub fn from_request(peer: &SocketAddr, parts: &Parts) -> Self {
        let header = |name| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        let http_version = format!("{:?}", parts.version);

        Self {
            remote_addr: peer.ip().to_string(),
            time: Local::now(),
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(ToString::to_string),
            http_version: http_version.trim_start_matches("HTTP/").to_string(),
            status: 0,
            body_bytes: 0,
            referer: header(REFERER),
            user_agent: header(USER_AGENT),
            request_time_us: 0,
        }
    }

    /// Record the response outcome
    pub fn finish(&mut self, status: u16, body_bytes: u64, elapsed: Duration) {
        self.status = status;
        self.body_bytes = body_bytes;
        self.request_time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!("{} {} HTTP/{}", self.method, self.request_uri(), self.http_version)
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$status`,
    /// `$body_bytes_sent`, `$http_referer`, `$http_user_agent`,
    /// `$request_time` (seconds, 3 decimal places)
    ///
    /// The pattern is scanned once; substituted values are never rescanned.
    fn format_custom(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(var) = VARIABLES.iter().find(|v| tail.starts_with(**v)) {
                out.push_str(&self.variable(var));
                rest = &tail[var.len()..];
            } else {
                out.push('$');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }

    fn variable(&self, name: &str) -> String {
        match name {
            "$remote_addr" => self.remote_addr.clone(),
            "$time_local" => self.time.format(CLF_TIME).to_string(),
            "$time_iso8601" => self.time.to_rfc3339(),
            "$request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let seconds = self.request_time_us as f64 / 1_000_000.0;
                format!("{seconds:.3}")
            }
            "$request_method" => self.method.clone(),
            "$request_uri" => self.request_uri(),
            "$request" => self.request_line(),
            "$status" => self.status.to_string(),
            "$body_bytes_sent" => self.body_bytes.to_string(),
            "$http_referer" => self.referer.clone().unwrap_or_else(|| "-".into()),
            "$http_user_agent" => self.user_agent.clone().unwrap_or_else(|| "-".into()),
            _ => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{Method, Request, Version};

    fn entry() -> AccessLogEntry {
        let (parts, ()) = Request::builder()
            .method(Method::GET)
            .uri("/fake_names/?skip=1&limit=2")
            .version(Version::HTTP_11)
            .header(REFERER, "https://example.com")
            .header(USER_AGENT, "curl/8.0")
            .body(())
            .unwrap()
            .into_parts();
        let peer: SocketAddr = "192.168.1.1:50000".parse().unwrap();

        let mut entry = AccessLogEntry::from_request(&peer, &parts);
        entry.finish(200, 31, Duration::from_micros(1500));
        entry
    }

    #[test]
    fn test_from_request() {
        let e = entry();
        assert_eq!(e.remote_addr, "192.168.1.1");
        assert_eq!(e.path, "/fake_names/");
        assert_eq!(e.query.as_deref(), Some("skip=1&limit=2"));
        assert_eq!(e.http_version, "1.1");
        assert_eq!(e.request_time_us, 1500);
    }

    #[test]
    fn test_format_combined() {
        let log = entry().format("combined");
        assert!(log.starts_with("192.168.1.1 - - ["));
        assert!(log.contains("\"GET /fake_names/?skip=1&limit=2 HTTP/1.1\" 200 31"));
        assert!(log.ends_with("\"https://example.com\" \"curl/8.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = entry().format("common");
        assert!(log.contains("\"GET /fake_names/?skip=1&limit=2 HTTP/1.1\" 200 31"));
        // Common format does not include referer/user-agent
        assert!(!log.contains("https://example.com"));
    }

    #[test]
    fn test_format_json() {
        let log = entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "192.168.1.1");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["status"], 200);
        assert_eq!(value["body_bytes"], 31);
        assert_eq!(value["query"], "skip=1&limit=2");
    }

    #[test]
    fn test_format_custom() {
        let log = entry().format("$remote_addr $request_method $status $request_time");
        // 1500us = 0.0015s, rendered with 3 decimal places
        assert!(log.starts_with("192.168.1.1 GET 200 0.00"), "got: {log}");
    }

    #[test]
    fn test_format_custom_request_line() {
        let log = entry().format("[$request] $http_referer");
        assert_eq!(
            log,
            "[GET /fake_names/?skip=1&limit=2 HTTP/1.1] https://example.com"
        );
    }

    #[test]
    fn test_format_custom_does_not_expand_request_data() {
        let (parts, ()) = Request::builder()
            .uri("/files/$status?x=$remote_addr")
            .header(USER_AGENT, "agent $http_referer")
            .body(())
            .unwrap()
            .into_parts();
        let peer: SocketAddr = "10.0.0.1:1".parse().unwrap();
        let mut entry = AccessLogEntry::from_request(&peer, &parts);
        entry.finish(404, 0, Duration::ZERO);

        assert_eq!(
            entry.format("$request_uri $status [$http_user_agent] $$ $unknown"),
            "/files/$status?x=$remote_addr 404 [agent $http_referer] $$ $unknown"
        );
    }
}
