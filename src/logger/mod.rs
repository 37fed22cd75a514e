//! Logger module
//!
//! Provides logging utilities for the service including:
//! - Subscriber setup (`tracing-subscriber`, text or JSON output)
//! - Server lifecycle logging
//! - Access logging with multiple formats

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LogFormat, LoggingConfig};
use crate::routing::RouteTable;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `logging.level` when set.
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init()?,
    }
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        listen = %format!("http://{addr}"),
        level = %config.logging.level,
        workers = ?config.server.workers,
        max_connections = ?config.performance.max_connections,
        max_body_size = config.http.max_body_size,
        "server started"
    );
}

/// Log the registered routes in dispatch order
pub fn log_routes(routes: &RouteTable) {
    tracing::info!(count = routes.routes().len(), "routes registered");
    for route in routes.routes() {
        tracing::info!(name = route.name, "  {}", route.describe());
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!(error = ?err, "failed to serve connection");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown() {
    tracing::info!("shutdown requested, no longer accepting connections");
}
