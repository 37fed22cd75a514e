//! HTTP protocol layer module
//!
//! Turns dispatch outcomes into hyper responses, decoupled from routing logic.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_400_response, build_413_response, build_error_response,
    build_redirect_response_with_code, json_response, strip_body,
};
