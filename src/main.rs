use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod params;
mod routing;
mod schema;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg.logging)?;

    // Size the Tokio runtime from `server.workers`
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!(workers, "using configured worker threads");
    } else {
        tracing::info!("using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let routes = handler::tutorial::routes()?;
    let listener = server::create_reusable_listener(addr, cfg.performance.backlog)?;

    logger::log_server_start(&addr, &cfg);
    logger::log_routes(&routes);

    let state = Arc::new(config::AppState::new(cfg, routes));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::run(listener, state, Arc::clone(&signals.shutdown)).await;
    Ok(())
}
