//! Parameter module
//!
//! Declares typed path/query parameters and binds them from a request:
//! - `spec`: parameter descriptors and the `PathEnum` trait
//! - `query`: query string and path decoding
//! - `bind`: conversion, defaults and constraint checks

mod bind;
mod query;
mod spec;

pub use bind::{bind, parse_int, ConversionError, Params, INT_PARSING, INT_PARSING_SIZE};
pub use query::{decode_path, QueryPairs};
pub use spec::{ParamSpec, ParamType, ParamValue, PathEnum, Source};
