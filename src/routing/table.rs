//! Route table and dispatcher
//!
//! Routes are registered once at startup, compiled, and kept in order.
//! `RouteTable::dispatch` runs the full request pipeline: match, bind
//! parameters, validate the body, call the handler.

use hyper::Method;
use serde_json::Value;
use thiserror::Error;

use super::matcher::match_route;
use super::pattern::{PathPattern, PatternError};
use crate::error::{DispatchError, FieldIssue};
use crate::params::{self, decode_path, ParamSpec, Params, QueryPairs, Source};
use crate::schema::RecordSchema;

pub type HandlerResult = Result<Value, DispatchError>;

/// Handlers are plain functions of their bound parameters
pub type HandlerFn = fn(&Params) -> HandlerResult;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("route {method} {pattern}: path parameter '{name}' has no placeholder")]
    UnknownPlaceholder {
        method: Method,
        pattern: String,
        name: String,
    },
    #[error("route {method} {pattern}: parameter '{name}' declared twice")]
    DuplicateParam {
        method: Method,
        pattern: String,
        name: String,
    },
}

/// Uncompiled route declaration
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub name: &'static str,
    pub method: Method,
    pub pattern: &'static str,
    pub params: Vec<ParamSpec>,
    pub body: Option<RecordSchema>,
    pub handler: HandlerFn,
}

impl RouteDef {
    pub const fn new(method: Method, pattern: &'static str, handler: HandlerFn) -> Self {
        Self {
            name: pattern,
            method,
            pattern,
            params: Vec::new(),
            body: None,
            handler,
        }
    }

    pub const fn get(pattern: &'static str, handler: HandlerFn) -> Self {
        Self::new(Method::GET, pattern, handler)
    }

    pub const fn post(pattern: &'static str, handler: HandlerFn) -> Self {
        Self::new(Method::POST, pattern, handler)
    }

    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Body validated against `schema`, bound as the route's body
    #[must_use]
    pub fn body(mut self, schema: RecordSchema) -> Self {
        self.body = Some(schema);
        self
    }

    pub fn compile(self) -> Result<Route, RouteError> {
        let pattern = PathPattern::parse(self.pattern)?;

        for (index, spec) in self.params.iter().enumerate() {
            if self.params[..index].iter().any(|p| p.name == spec.name) {
                return Err(RouteError::DuplicateParam {
                    method: self.method.clone(),
                    pattern: self.pattern.to_string(),
                    name: spec.name.to_string(),
                });
            }
            if spec.source == Source::Path && !pattern.placeholders().any(|p| p == spec.name) {
                return Err(RouteError::UnknownPlaceholder {
                    method: self.method.clone(),
                    pattern: self.pattern.to_string(),
                    name: spec.name.to_string(),
                });
            }
        }

        Ok(Route {
            name: self.name,
            method: self.method,
            pattern,
            params: self.params,
            body: self.body,
            handler: self.handler,
        })
    }
}

/// Compiled, immutable route
#[derive(Debug)]
pub struct Route {
    pub name: &'static str,
    pub method: Method,
    pub pattern: PathPattern,
    pub params: Vec<ParamSpec>,
    pub body: Option<RecordSchema>,
    pub handler: HandlerFn,
}

impl Route {
    /// One-line summary for the startup listing; hidden parameters omitted
    pub fn describe(&self) -> String {
        let mut out = format!("{} {}", self.method, self.pattern.as_str());
        let visible: Vec<String> = self
            .params
            .iter()
            .filter(|p| p.include_in_schema && p.source == Source::Query)
            .map(ParamSpec::describe)
            .collect();
        if !visible.is_empty() {
            out.push_str(&format!(" ? {}", visible.join(", ")));
        }
        if let Some(schema) = &self.body {
            out.push_str(&format!(" <- {}", schema.name));
        }
        out
    }
}

/// The parts of an HTTP request the dispatcher needs
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
    pub method: &'a Method,
    /// Raw (still percent-encoded) path
    pub path: &'a str,
    pub query: Option<&'a str>,
    /// `Content-Type` header value, if any
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
}

/// Successful dispatch outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json(Value),
    /// Same path with the trailing slash toggled; carries the `Location`
    Redirect(String),
}

#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, def: RouteDef) -> Result<(), RouteError> {
        self.routes.push(def.compile()?);
        Ok(())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn dispatch(&self, req: &RequestParts<'_>) -> Result<Reply, DispatchError> {
        let path = decode_path(req.path);

        let Some(found) = match_route(req.method, &path, &self.routes) else {
            if let Some(location) = self.slash_redirect(req) {
                tracing::debug!(from = req.path, to = %location, "redirecting trailing slash");
                return Ok(Reply::Redirect(location));
            }
            return Err(DispatchError::NotFound {
                method: req.method.to_string(),
                path,
            });
        };
        let route = found.route;
        tracing::debug!(route = route.name, method = %req.method, path = %path, "route matched");

        let query = QueryPairs::parse(req.query);
        let mut issues: Vec<FieldIssue> = Vec::new();

        let mut bound = params::bind(&route.params, &found.captures, &query).unwrap_or_else(|mut e| {
            issues.append(&mut e);
            Params::default()
        });

        if let Some(schema) = &route.body {
            match schema.validate_bytes(req.body, req.content_type) {
                Ok(item) => bound.set_body(item),
                Err(mut e) => issues.append(&mut e),
            }
        }

        if !issues.is_empty() {
            return Err(DispatchError::Validation(issues));
        }

        (route.handler)(&bound).map(Reply::Json)
    }

    /// `Location` for the same path with its trailing slash toggled, if that
    /// path matches a route for this method
    fn slash_redirect(&self, req: &RequestParts<'_>) -> Option<String> {
        if req.path == "/" {
            return None;
        }
        let toggled = match req.path.strip_suffix('/') {
            Some(trimmed) => trimmed.to_string(),
            None => format!("{}/", req.path),
        };
        match_route(req.method, &decode_path(&toggled), &self.routes)?;

        Some(match req.query {
            Some(q) if !q.is_empty() => format!("{toggled}?{q}"),
            _ => toggled,
        })
    }
}
