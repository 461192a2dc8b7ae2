//! WebRTC Signaling Relay - Entry Point
//!
//! Binds the TCP listener and hands it to the relay accept loop.

use std::env;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use signal_relay::{serve, RelayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=signal_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("signal_relay=info")),
        )
        .init();

    // Bind address from command line or default
    let config = match env::args().nth(1) {
        Some(addr) => RelayConfig::with_addr(&addr)?,
        None => RelayConfig::default(),
    };

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        "Signaling relay listening on ws://{}{}",
        config.bind_addr, config.path
    );

    serve(listener, config).await;

    Ok(())
}
