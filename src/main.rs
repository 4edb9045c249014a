//! Chat Relay Server - Entry Point
//!
//! Parses the command line, sets up logging and runs the relay until the
//! operator shuts it down.

use clap::Parser;
use tracing::error;

use relay_chat::logger::setup_logger;
use relay_chat::{run, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    // Use RUST_LOG env var to control log level
    setup_logger(&config.log_file, "info")?;

    if let Err(e) = run(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    // Hard stop: connections still open after the grace period are cut off
    std::process::exit(0);
}
