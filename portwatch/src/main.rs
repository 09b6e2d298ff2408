//! Serial Port Watcher
//!
//! Prints the serial ports attached at startup, then reports every port
//! that is plugged in or removed until interrupted.

mod console;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use console::{ConsoleSink, OutputFormat};
use port_detect::{
    ChangeSignalSource, MetadataResolver, PollingSignalSource, PortScanner, SerialportInventory,
};
use port_watch::{PortEventSink, Watcher};
use settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "portwatch", about = "Watch serial ports being attached and detached")]
struct Cli {
    /// Settings file (defaults to $XDG_CONFIG_HOME/portwatch/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the change poll interval in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
    /// Print the currently attached ports and exit
    #[arg(long)]
    list: bool,
    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.config.clone().or_else(Settings::default_path);
    let mut settings = settings_path
        .as_deref()
        .map(Settings::load_from)
        .unwrap_or_default();
    if let Some(ms) = cli.poll_interval_ms {
        settings.poll_interval_ms = ms;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.init_config {
        let path = settings_path.context("could not determine settings path")?;
        settings.save_to(&path)?;
        tracing::info!("Wrote settings to {}", path.display());
        return Ok(());
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut sink = ConsoleSink::stdout(format);

    let scanner = Arc::new(PortScanner::with_config(settings.scanner_config()));
    let resolver = MetadataResolver::new(SerialportInventory::new());
    let (watcher, mut events) = Watcher::new(scanner.clone(), resolver, settings.watcher_config());

    tracing::info!("Starting serial port watcher");
    let handle = watcher.start();

    if cli.list {
        // The startup pass completes before the snapshot query is answered
        let snapshot = handle.snapshot().await?;
        for port in snapshot.ports {
            sink.on_initial_port(port);
        }
        handle.stop().await?;
        return Ok(());
    }

    let signals = handle.signaller();
    let _subscription = PollingSignalSource::with_interval(scanner, settings.poll_interval())
        .subscribe(move || {
            signals.notify();
        });

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break; };
                event.dispatch(&mut sink);
            }
            _ = &mut shutdown => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    handle.stop().await?;
    Ok(())
}
