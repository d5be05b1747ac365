//! Chat Hub Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p chat-hub
//! ```
//!
//! Configuration is loaded from environment variables.

use anyhow::Context;
use chat_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Hub failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        address = %config.server.address(),
        "Configuration loaded"
    );

    chat_hub::run(config).await.context("Hub server error")?;

    Ok(())
}
