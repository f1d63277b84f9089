//! Terminal client for the Beacon relay with reconnection support.
//!
//! As a display it creates a room, prints the code to share and shows every
//! event the controller sends. As a controller it joins a room by code and
//! sends the commands typed at the prompt.
//! Automatically re-enters the room after a disconnection (max 5 attempts with
//! 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin beacon-client -- --role display
//! cargo run --bin beacon-client -- --role controller --room 4821
//! ```

use clap::Parser;

use beacon_client::{Role, run_client};
use beacon_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "beacon-client")]
#[command(about = "Terminal display or controller for a Beacon relay room", long_about = None)]
struct Args {
    /// Role to play in the room
    #[arg(short = 'r', long, value_enum, default_value_t = Role::Controller)]
    role: Role,

    /// Room code to join (a display with a code reconnects to that room)
    #[arg(short = 'c', long, env = "BEACON_ROOM")]
    room: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:3000/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = run_client(args.url, args.role, args.room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
