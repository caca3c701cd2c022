//! # Stash Server
//!
//! Serves the cached user directory over REST.

use metrics_exporter_prometheus::PrometheusBuilder;
use stash_cache::metrics::register_metrics;
use stash_config::ConfigLoader;
use stash_core::{init_logging, LoggingConfig, StashError, StashResult};
use stash_server::{
    di::{build_app_state, build_module},
    rest::{create_router, with_metrics_endpoint},
    startup::{print_banner, print_startup_info},
};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Falls back to default logging when the config never loaded.
        let _ = init_logging(&LoggingConfig::default());
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> StashResult<()> {
    let config = ConfigLoader::from_default_location()?.into_config();

    init_logging(&config.observability.logging())?;
    print_banner();
    info!("Starting Stash Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| StashError::internal(format!("Failed to install metrics recorder: {}", e)))?;
    register_metrics();

    let module = build_module(&config.cache)?;
    let state = build_app_state(&module, &config.cache);
    let router = with_metrics_endpoint(create_router(state, &config.server), metrics_handle);

    let rest_addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&rest_addr)
        .await
        .map_err(|e| StashError::internal(format!("Failed to bind REST: {}", e)))?;

    print_startup_info(&config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StashError::internal(format!("REST server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
