//! Routing module
//!
//! Provides the request router:
//! - Path patterns with literal, placeholder and rest-of-path segments
//! - Most-specific-literal-first matching over an ordered route table
//! - Dispatch: parameter binding, body validation, handler invocation

mod matcher;
mod pattern;
mod table;

pub use table::{HandlerResult, Reply, RequestParts, RouteDef, RouteError, RouteTable};
