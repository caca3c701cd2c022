//! Server startup utilities.

use stash_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r#"
   _____ __            __
  / ___// /_____ _____/ /_
  \__ \/ __/ __ `/ ___/ __ \
 ___/ / /_/ /_/ (__  ) / / /
/____/\__/\__,_/____/_/ /_/

      cache-aside user directory
    "#
    );
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("REST API:  http://{}/api/v1", addr);
    info!("Health:    http://{}/health", addr);
    info!("Stats:     http://{}/api/v1/cache/stats", addr);
    info!("Metrics:   http://{}/metrics", addr);
    info!(
        "Cache:     provider={} default_ttl={}s single_flight={}",
        config.cache.effective_provider(),
        config.cache.default_ttl_seconds,
        config.cache.single_flight
    );
    info!("{}", separator);
}
