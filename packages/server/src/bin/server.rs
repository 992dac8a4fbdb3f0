//! Line-oriented TCP chat server.
//!
//! Accepts any number of clients, relays every received line to all of them and keeps their
//! user lists up to date.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin madang-server
//! cargo run --bin madang-server -- --host 0.0.0.0 --port 12345 --admin-port 8080
//! ```

use clap::Parser;
use madang_server::ui::{ServerConfig, run_server};
use madang_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "madang-server")]
#[command(about = "Line-oriented TCP chat server with broadcast support", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the chat server to
    #[arg(short = 'p', long, default_value = "12345")]
    port: u16,

    /// Close sessions that send a line longer than this many bytes
    #[arg(long)]
    max_line_length: Option<usize>,

    /// Serve the read-only admin HTTP API on this port
    #[arg(long)]
    admin_port: Option<u16>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_line_length: args.max_line_length,
            admin_port: args.admin_port,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_server(args.into()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
