//! Terminal chat client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomchat -- --base-url http://localhost:8080 --name alice --room general
//! ```

use clap::Parser;
use roomchat_client::{
    ClientConfig,
    config::{DEFAULT_BASE_URL, DEFAULT_WS_PATH},
    domain::repository::DEFAULT_HISTORY_PAGE_SIZE,
    ui::render::DEFAULT_WIDTH,
};
use roomchat_shared::logger::setup_logger;

#[derive(Debug, Parser)]
#[command(name = "roomchat", version, about = "Join a chat room and talk in real time")]
struct Cli {
    /// Room service base URL
    #[arg(long, env = "CHAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Broker WebSocket path (Spring SockJS endpoints accept raw sockets at `<path>/websocket`)
    #[arg(long, env = "CHAT_WS_PATH", default_value = DEFAULT_WS_PATH)]
    ws_path: String,

    /// Number of history messages loaded when entering a room
    #[arg(long, default_value_t = DEFAULT_HISTORY_PAGE_SIZE)]
    page_size: u32,

    /// Render width in columns
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Pre-fill the name field
    #[arg(long)]
    name: Option<String>,

    /// Pre-fill the room field
    #[arg(long)]
    room: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &cli.log_level);

    let config = match ClientConfig::new(&cli.base_url, &cli.ws_path)
        .and_then(|config| config.with_page_size(cli.page_size))
        .and_then(|config| config.with_width(cli.width))
    {
        Ok(config) => config.with_form(cli.name, cli.room),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    // Run the client
    if let Err(e) = roomchat_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        eprintln!("{e}");
        std::process::exit(1);
    }
}
