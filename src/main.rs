//! Gridmatch - coordinator binary.
//!
//! Drives the matchmaking coordinator either over newline-delimited JSON
//! events on stdin, or through a scripted demo game.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use gridmatch::{
    ChannelTransport, ClientEvent, Config, Coordinator, Delivery, MemoryScoreStore, ServerEvent,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            queue_ttl,
            eviction_tick,
        } => run_serve(queue_ttl, eviction_tick).await,
        Command::Demo => run_demo().await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the coordinator over stdin/stdout JSON lines
async fn run_serve(queue_ttl: Option<u64>, eviction_tick: Option<u64>) -> Result<()> {
    init_tracing();

    // Flags beat environment variables; both fall back to defaults.
    let mut config = Config::from_env();
    if let Some(ttl) = queue_ttl {
        config.queue_ttl_secs = ttl;
    }
    if let Some(tick) = eviction_tick {
        config.eviction_tick_secs = tick;
    }
    info!(?config, "Starting gridmatch coordinator");

    let (transport, mut outbound) = ChannelTransport::new();
    let coordinator = Coordinator::new(
        Arc::new(transport),
        Arc::new(MemoryScoreStore::new()),
        config,
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let timer = coordinator.spawn_eviction_timer(shutdown_rx);

    // Outbound deliveries go to stdout, one JSON object per line.
    let printer = tokio::spawn(async move {
        while let Some(delivery) = outbound.recv().await {
            match serde_json::to_string(&delivery) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!(%err, "Failed to serialize outbound delivery"),
            }
        }
    });

    info!("Coordinator ready, reading events from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<ClientEvent>(line) {
                        Ok(event) => coordinator.handle(event),
                        Err(err) => warn!(%err, "Malformed client event dropped"),
                    }
                }
                None => {
                    info!("Stdin closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                break;
            }
        }
    }

    shutdown_tx.send(true).ok();
    timer.await?;
    drop(coordinator);
    printer.await?;
    Ok(())
}

/// Run a scripted two-player demo game
async fn run_demo() -> Result<()> {
    init_tracing();

    let (transport, mut outbound) = ChannelTransport::new();
    let coordinator = Coordinator::new(
        Arc::new(transport),
        Arc::new(MemoryScoreStore::new()),
        Config::default(),
    );

    coordinator.handle(ClientEvent::JoinQueue {
        identity: "alice".into(),
        connection: "conn-alice".into(),
    });
    coordinator.handle(ClientEvent::JoinQueue {
        identity: "bob".into(),
        connection: "conn-bob".into(),
    });

    // The opening turn is random; read the game_start events to learn who
    // moves first and which session was created.
    let mut session_id = None;
    let mut opener = None;
    while let Ok(delivery) = outbound.try_recv() {
        if let (
            Some(to),
            ServerEvent::GameStart {
                session_id: sid,
                your_turn: true,
                ..
            },
        ) = (&delivery.to, &delivery.event)
        {
            session_id = Some(sid.clone());
            opener = Some(if to == "conn-alice" { "alice" } else { "bob" });
        }
        print_delivery(&delivery);
    }
    let session_id = session_id.context("pairing produced no game_start event")?;
    let opener = opener.context("no player holds the opening turn")?;
    let follower = if opener == "alice" { "bob" } else { "alice" };

    // Opener takes the top row while the follower fills the middle one.
    for (identity, position) in [
        (opener, 0),
        (follower, 3),
        (opener, 1),
        (follower, 4),
        (opener, 2),
    ] {
        coordinator.handle(ClientEvent::MakeMove {
            identity: identity.into(),
            session_id: session_id.clone(),
            position,
        });
    }
    while let Ok(delivery) = outbound.try_recv() {
        print_delivery(&delivery);
    }

    println!("\nLeaderboard:");
    for record in coordinator.leaderboard()? {
        println!(
            "  #{} {} - {} points over {} games",
            record.rank(),
            record.identity(),
            record.score(),
            record.games_played()
        );
    }
    Ok(())
}

fn print_delivery(delivery: &Delivery) {
    let target = delivery.to.as_deref().unwrap_or("all");
    match serde_json::to_string(&delivery.event) {
        Ok(json) => println!("-> {target}: {json}"),
        Err(err) => warn!(%err, "Failed to serialize event"),
    }
}
