//! SignalGatekeeper - Main Entry Point
//!
//! Long-running triage service: consumes raw hunter signals, buffers
//! them per ticker in rolling windows, and releases only windows that
//! show confluence or high conviction.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use signal_gatekeeper::config::loader::load_config;
use signal_gatekeeper::{
    create_signal_channel_with_size, ChannelTransport, ColdStorageWriter, ExpirySweeper,
    RetryingTransport, SharedTransport, TriageEngine,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting SignalGatekeeper service");
    info!("Configuration file: {}", args.config);

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = load_config(Some(&args.config))?;
    info!(
        rolling_window_seconds = config.triage.rolling_window_seconds,
        min_volume = config.triage.min_volume,
        min_rvol = config.triage.min_rvol,
        confluence_threshold = config.triage.confluence_threshold,
        tech_score_threshold = config.triage.tech_score_threshold,
        "triage thresholds loaded"
    );

    // Inbox for raw signals; the broker consumer attaches to `raw_tx`
    let (raw_tx, raw_rx) = create_signal_channel_with_size(config.settings.channel_buffer_size);

    // Outbound topics; broker producers would attach to these receivers
    let (validated_tx, mut validated_rx) = mpsc::channel(config.settings.channel_buffer_size);
    let (cold_tx, mut cold_rx) = mpsc::channel(config.settings.channel_buffer_size);
    let (dead_tx, mut dead_rx) = mpsc::channel(config.settings.channel_buffer_size);

    let inner = ChannelTransport::new()
        .route(config.topics.validated_signals.clone(), validated_tx)
        .route(config.topics.cold_storage.clone(), cold_tx)
        .route(config.topics.dead_letter.clone(), dead_tx);
    let transport: SharedTransport = Arc::new(RetryingTransport::new(
        Arc::new(inner),
        config.settings.publish_max_attempts,
        config.settings.publish_backoff(),
        config.topics.dead_letter.clone(),
    ));

    let engine = Arc::new(TriageEngine::new(&config, transport.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = ExpirySweeper::new(
        engine.store(),
        ColdStorageWriter::new(transport.clone(), config.topics.cold_storage.clone()),
        config.settings.sweep_interval(&config.triage),
    );
    let sweeper_handle = sweeper.spawn(shutdown_rx.clone());

    let engine_handle = {
        let engine = engine.clone();
        let shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move {
            engine.run(raw_rx, shutdown_rx).await;
        })
    };

    // Surface outbound payloads in the log until broker producers attach
    tokio::spawn(async move {
        while let Some(payload) = validated_rx.recv().await {
            info!(%payload, "validated signal ready for analysis");
        }
    });
    tokio::spawn(async move {
        while let Some(payload) = cold_rx.recv().await {
            debug!(%payload, "window archived to cold storage");
        }
    });
    tokio::spawn(async move {
        while let Some(payload) = dead_rx.recv().await {
            error!(%payload, "payload routed to dead-letter");
        }
    });

    info!("SignalGatekeeper running; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, cleaning up...");

    // Stop feeding the inbox, then let the engine drain live windows
    drop(raw_tx);
    let _ = shutdown_tx.send(true);

    engine_handle.await?;
    sweeper_handle.await?;

    info!("SignalGatekeeper stopped cleanly");
    Ok(())
}
