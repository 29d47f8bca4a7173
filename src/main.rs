//! Chat Relay Server - Entry Point
//!
//! Binds the TCP listener and runs the acceptor until the listener fails.

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_relay::{serve, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    let config = ServerConfig::parse();

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Chat Relay Server listening on {}", listener.local_addr()?);

    if let Err(e) = serve(listener, config.max_line_length).await {
        error!("Server stopped: {}", e);
        return Err(e.into());
    }

    Ok(())
}
