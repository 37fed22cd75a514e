//! Dispatch error types
//!
//! Every request that cannot reach a handler ends in one of two errors:
//! no route matched, or the request failed parameter/body validation.

use hyper::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// A single validation problem, reported in the same shape for path,
/// query and body failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    /// Machine-readable error kind (e.g. `missing`, `int_parsing`)
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Location of the offending value, e.g. `["query", "skip"]`
    pub loc: Vec<Value>,
    /// Human-readable message
    pub msg: String,
    /// The rejected input, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

impl FieldIssue {
    pub fn new(kind: &'static str, loc: Vec<Value>, msg: impl Into<String>) -> Self {
        Self {
            kind,
            loc,
            msg: msg.into(),
            input: None,
        }
    }

    /// Required value was not supplied
    pub fn missing(loc: Vec<Value>) -> Self {
        Self::new("missing", loc, "Field required").with_input(Value::Null)
    }

    #[must_use]
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    /// Dotted location, used in log lines and error summaries
    pub fn location(&self) -> String {
        self.loc
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Build a location from a source label and a field name
pub fn loc(source: &str, name: &str) -> Vec<Value> {
    vec![Value::from(source), Value::from(name)]
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No route matches method + path
    #[error("no route for {method} {path}")]
    NotFound { method: String, path: String },

    /// Parameters or body failed type/constraint checks
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<FieldIssue>),
}

impl DispatchError {
    pub fn validation(issue: FieldIssue) -> Self {
        Self::Validation(vec![issue])
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// JSON body returned to the client
    pub fn to_body(&self) -> Value {
        match self {
            Self::NotFound { .. } => json!({ "detail": "Not Found" }),
            Self::Validation(issues) => json!({ "detail": issues }),
        }
    }
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.location(), issue.msg))
        .collect::<Vec<_>>()
        .join("; ")
}
