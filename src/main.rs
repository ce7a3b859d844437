//! sdplus - connectivity check for a ServiceDesk Plus instance
//!
//! Verifies the configured endpoint and technician key, then prints the
//! most recent requests as JSON on stdout.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `SDP_BASE_URL`: Base URL of your ServiceDesk Plus instance
//! - `SDP_API_KEY`: Technician API key for authentication
//!
//! # Usage
//!
//! ```bash
//! SDP_BASE_URL=http://sdplus SDP_API_KEY=... ./sdplus
//! ```

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use sdplus::{Config, RequestListParams, SdpClient};

/// Number of requests printed.
const RECENT_REQUESTS: u32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout carries the JSON output, logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sdplus=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("sdplus v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::debug!("Configuration loaded, base_url: {}", config.base_url);

    let client = SdpClient::new(&config).context("Failed to create SDP client")?;

    tracing::info!("Testing connection to ServiceDesk Plus...");
    if let Err(e) = client.test_connection().await {
        tracing::error!(error = %e, "Connection test failed");
        tracing::warn!("Continuing; the request listing below will likely fail as well");
    }

    let requests = client
        .request_get_requests(RequestListParams::new().with_limit(RECENT_REQUESTS))
        .await
        .context("Failed to list requests")?;

    tracing::info!(count = requests.len(), "Fetched recent requests");

    let json = serde_json::to_string_pretty(&requests).context("Failed to encode requests")?;
    println!("{}", json);

    Ok(())
}
