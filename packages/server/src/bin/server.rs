//! Beacon relay server.
//!
//! Pairs a display and a controller by room code and relays their events.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin beacon-server
//! cargo run --bin beacon-server -- --host 0.0.0.0 --port 3000 --data-dir ./data --static-dir ./public
//! ```

use std::path::PathBuf;

use beacon_server::{
    app::build_server,
    ui::{AccessPolicyKind, ServerConfig},
};
use beacon_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "beacon-server")]
#[command(about = "Room relay between a display and a controller", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "BEACON_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "BEACON_PORT", default_value = "3000")]
    port: u16,

    /// Directory holding persisted room records (persistence is off when omitted)
    #[arg(long, env = "BEACON_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory of static client assets
    #[arg(long, env = "BEACON_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Which room codes a connection may address
    #[arg(long, env = "BEACON_ACCESS_POLICY", value_enum, default_value_t = AccessPolicyKind::TrustPayload)]
    access_policy: AccessPolicyKind,

    /// Refuse join-room while a controller is already bound
    #[arg(long, env = "BEACON_EXCLUSIVE_CONTROLLER")]
    exclusive_controller: bool,

    /// Suffix annotation ids that collide within a room
    #[arg(long, env = "BEACON_UNIQUE_ANNOTATION_IDS")]
    unique_annotation_ids: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "BEACON_LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            data_dir: args.data_dir,
            static_dir: args.static_dir,
            access_policy: args.access_policy,
            exclusive_controller: args.exclusive_controller,
            unique_annotation_ids: args.unique_annotation_ids,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    tracing::debug!("{:?}", config);

    let server = match build_server(&config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to restore rooms: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
