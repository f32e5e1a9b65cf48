//! Cardpoll - Main entry point
//!
//! Brings up the shared SPI bus and both card readers, then polls them on a
//! fixed cadence and prints every card read as one JSON line on stdout.
//! Cards are simulated and steered from stdin (see [`console`]).

mod config;
mod console;

use anyhow::Result;
use cardpoll_core::RfidEvent;
use cardpoll_hardware::devices::{AnyCardReader, AnySpiBus};
use cardpoll_hardware::mock::{MockCardReader, MockSpiBus};
use cardpoll_hardware::{PollLoop, ReaderBank};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "cardpoll")]
#[command(about = "Dual-reader contactless card poller")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "cardpoll.toml")]
    config: PathBuf,

    /// Delay between poll cycles in milliseconds (overrides the config file)
    #[arg(short, long)]
    poll_interval_ms: Option<u64>,

    /// Log filter used when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the events
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    info!("Cardpoll v{}", cardpoll_core::VERSION);

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    if let Some(interval_ms) = args.poll_interval_ms {
        config.poll.interval_ms = interval_ms;
    }
    config.validate()?;

    info!(
        interval_ms = config.poll.interval_ms,
        channel_capacity = config.poll.channel_capacity,
        "Configuration loaded"
    );

    // Bring-up: bus first, then reader 1, then reader 2
    let (bus, _bus_handle) = MockSpiBus::new();
    let (first, first_handle) = MockCardReader::new(config.reader1);
    let (second, second_handle) = MockCardReader::new(config.reader2);

    let bank = ReaderBank::new(
        AnySpiBus::Mock(bus),
        config.bus,
        AnyCardReader::Mock(first),
        AnyCardReader::Mock(second),
    )?
    .initialize()
    .await?;

    let (tx, rx) = mpsc::channel(config.poll.channel_capacity);
    let consumer = tokio::spawn(consume(rx));

    let (quit_tx, quit_rx) = oneshot::channel();
    let console = console::Console::new([first_handle, second_handle]);
    tokio::spawn(console.run(console::spawn_stdin_reader(16), quit_tx));

    let mut poller = PollLoop::new(bank, tx, config.schedule());
    info!("Polling; type 'present <reader> <uid>' to simulate a card");

    tokio::select! {
        _ = poller.run() => {}
        Ok(()) = quit_rx => info!("Quit requested"),
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Interrupted");
        }
    }

    let stats = poller.stats().clone();
    drop(poller);
    if let Err(e) = consumer.await {
        warn!(error = %e, "Consumer task failed");
    }

    info!(
        cycles = stats.cycles,
        cards_detected = stats.cards_detected,
        read_failures = stats.read_failures,
        events_dispatched = stats.events_dispatched,
        events_dropped = stats.events_dropped,
        "Poller stopped"
    );

    Ok(())
}

/// Drain the handoff channel, printing each event as JSON.
async fn consume(mut rx: mpsc::Receiver<RfidEvent>) {
    while let Some(event) = rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "Failed to encode event"),
        }
    }
}
