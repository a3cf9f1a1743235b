mod client;
mod strategies;
mod tracker;

use std::time::Duration;

use anyhow::{anyhow, bail};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use protocol::{Broadcast, Command, PlayerUpdate, SeatRequest};
use types::prelude::*;

use client::RpcClient;
use tracker::Tracker;

/// Figgie bot client.
#[derive(Debug, Parser)]
#[command(name = "figgie-bot")]
struct Cli {
    /// Server to connect to, HOST:PORT.
    #[arg(long, default_value = "127.0.0.1:58829")]
    server: String,

    /// Room to join.
    #[arg(long, default_value = "lobby")]
    room: String,

    /// Username. `--which` appends a numeric suffix.
    #[arg(long, default_value = "bot")]
    name: String,

    /// Instance number, suffixed to the username.
    #[arg(long)]
    which: Option<u32>,

    /// Strategy: noise or fundamental.
    #[arg(long, default_value = "noise")]
    strategy: String,

    /// RNG seed for the strategy.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Milliseconds between quote ticks.
    #[arg(long, default_value_t = 500)]
    quote_interval_ms: u64,

    /// Log level: debug, info, or error.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .init();

    let name = match cli.which {
        Some(n) => format!("{}{}", cli.name, n),
        None => cli.name.clone(),
    };
    let username = Username::new(&name).map_err(|e| anyhow!("bad username {name:?}: {e}"))?;
    let mut strategy = strategies::by_name(&cli.strategy, cli.seed)
        .ok_or_else(|| anyhow!("unknown strategy {:?}", cli.strategy))?;

    let url = format!("ws://{}/ws/{}", cli.server, cli.room);
    info!(%url, %username, strategy = strategy.name(), "connecting");
    let mut client = RpcClient::connect(&url).await?;

    client
        .call_ok(Command::Login {
            username: username.clone(),
        })
        .await?;
    let seat = client
        .call_ok(Command::StartPlaying(SeatRequest::SitAnywhere))
        .await?;
    info!(?seat, "seated");
    client.call_ok(Command::Ready { is_ready: true }).await?;

    run(&mut client, username, strategy.as_mut(), cli.quote_interval_ms).await
}

async fn run(
    client: &mut RpcClient,
    username: Username,
    strategy: &mut dyn strategies::Strategy,
    quote_interval_ms: u64,
) -> Result<(), anyhow::Error> {
    let mut tracker = Tracker::new(username.clone());
    let mut next_order_id: u64 = 1;
    let interval = Duration::from_millis(quote_interval_ms);

    loop {
        match tokio::time::timeout(interval, client.next_update()).await {
            Ok(Ok(update)) => {
                if let PlayerUpdate::Broadcast(Broadcast::RoundOver(results)) = &update {
                    info!(gold = %results.gold, "round over, re-readying");
                    tracker.observe(&update);
                    client.call_ok(Command::Ready { is_ready: true }).await?;
                    continue;
                }
                tracker.observe(&update);
            }
            Ok(Err(e)) => bail!("stream ended: {e}"),
            Err(_elapsed) => {
                if !tracker.in_round {
                    continue;
                }
                for quote in strategy.quotes(&tracker) {
                    let order = Order {
                        id: OrderId::new(next_order_id),
                        owner: username.clone(),
                        suit: quote.suit,
                        dir: quote.dir,
                        price: quote.price,
                        size: quote.size,
                    };
                    next_order_id += 1;
                    debug!(%order, "quoting");
                    match client.call(Command::Order(order)).await? {
                        Ok(_) => {}
                        // Rejections are normal mid-race; keep trading.
                        Err(kind) => warn!(?kind, "order rejected"),
                    }
                }
            }
        }
    }
}
