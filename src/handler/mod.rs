//! Request handler module
//!
//! Bridges hyper requests to the route table and holds the tutorial
//! endpoints with their fixture data.

pub mod fixtures;
pub mod router;
pub mod tutorial;

// Re-export main entry point
pub use router::handle_request;
