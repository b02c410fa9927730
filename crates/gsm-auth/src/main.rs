//! gsm-auth - Entry point.

use gsm_auth::{config::Config, logging, server};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    if let Err(e) = logging::init(&config.log) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting gsm-auth");

    if let Err(e) = server::run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Shutdown complete");
}
