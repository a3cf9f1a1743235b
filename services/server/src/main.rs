mod error;
mod room_task;
mod state;
mod ws;

use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::get, Router};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use state::AppState;
use types::config::GameConfig;

/// Figgie game server.
#[derive(Debug, Parser)]
#[command(name = "figgie-server")]
struct Cli {
    /// Port for the websocket listener.
    #[arg(long, default_value_t = 58829)]
    port: u16,

    /// Log level: debug, info, or error.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Round length in seconds.
    #[arg(long, default_value_t = 240)]
    round_seconds: u64,

    /// Pot awarded to the gold-majority holder each round.
    #[arg(long, default_value_t = 100)]
    pot: u32,

    /// Bonus paid per gold card held at round end.
    #[arg(long, default_value_t = 10)]
    gold_card_bonus: u32,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .init();

    let config = GameConfig {
        pot: cli.pot,
        per_gold_card_bonus: cli.gold_card_bonus,
        round_duration: Duration::from_secs(cli.round_seconds),
        ..GameConfig::default()
    };
    let state = AppState::new(config);

    let app = Router::new()
        .route("/ws/{room}", get(ws::ws_handler))
        .route("/health", get(ws::health_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
