//! Presence and broadcast server for Huddle.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin huddle-server
//! cargo run --bin huddle-server -- --host 0.0.0.0 --port 3000 --liveness-interval-secs 10
//! ```

use std::time::Duration;

use clap::Parser;
use huddle_server::{config::ServerConfig, ui::Server};
use huddle_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "huddle-server")]
#[command(about = "Project-scoped presence and broadcast server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds between liveness sweeps
    #[arg(long, default_value = "30")]
    liveness_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let config = match ServerConfig::new(
        args.host,
        args.port,
        Duration::from_secs(args.liveness_interval_secs),
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let server = Server::in_memory(&config);
    if let Err(e) = server.run(&config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
