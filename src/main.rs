//! HAProxy ingress controller backend.
//!
//! # Architecture Overview
//!
//! ```text
//!   ingress host ──▶ snapshot (JSON) ──┐
//!                                      ▼
//!                 ┌──────────────────────────────────────────────┐
//!                 │  haproxy::userlist   credential files         │
//!                 │  haproxy::server     default / http / https   │
//!                 │  haproxy::location   path_beg ACLs            │
//!                 │  haproxy::configuration  + overrides          │
//!                 └───────────────────────┬──────────────────────┘
//!                                         ▼
//!                 template::renderer ──▶ strip blank lines ──▶ haproxy.cfg
//! ```
//!
//! `render` runs a single pass, `watch` keeps re-rendering whenever the
//! snapshot file changes, `check` only validates settings and template.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use haproxy_ingress::config::{load_config, ControllerConfig, SnapshotWatcher};
use haproxy_ingress::ingress::{load_snapshot, Snapshot};
use haproxy_ingress::observability::{logging, metrics};
use haproxy_ingress::{ConfigBackend, HaproxyController};

#[derive(Parser)]
#[command(name = "haproxy-ingress")]
#[command(about = "Render HAProxy configuration from ingress snapshots", long_about = None)]
struct Cli {
    /// Controller settings (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the configuration once
    Render {
        /// Snapshot to render instead of the configured one
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Output file, or `-` for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render, then re-render whenever the snapshot changes
    Watch {
        /// Snapshot to watch instead of the configured one
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Validate settings and template, then exit
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ControllerConfig::default(),
    };

    logging::init_logging(&config.observability, cli.log_level.as_deref())?;
    tracing::info!("haproxy-ingress v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    match cli.command {
        Commands::Check => {
            // Template load failure is fatal and reported by `?`.
            let controller = HaproxyController::new(&config)?;
            tracing::info!(
                template = ?config.template.path,
                output = ?controller.output_path(),
                overrides = config.overrides.len(),
                "Configuration OK"
            );
        }
        Commands::Render { snapshot, output } => {
            if let Some(path) = snapshot {
                config.snapshot.path = path;
            }
            let to_stdout = output.as_deref().is_some_and(|p| p.as_os_str() == "-");
            if let Some(path) = output.filter(|_| !to_stdout) {
                config.output.path = path;
            }

            if config.snapshot.watch && !to_stdout {
                watch(config).await?;
            } else {
                let mut controller = HaproxyController::new(&config)?;
                let snapshot = load_snapshot(&config.snapshot.path)?;

                if to_stdout {
                    let conf = controller.build_configuration(&snapshot, &config.overrides)?;
                    let rendered = controller.render(&conf)?;
                    std::io::stdout().write_all(rendered)?;
                } else {
                    controller.sync(&snapshot)?;
                }
            }
        }
        Commands::Watch { snapshot } => {
            if let Some(path) = snapshot {
                config.snapshot.path = path;
            }
            watch(config).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn watch(config: ControllerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = HaproxyController::new(&config)?;
    let debounce = Duration::from_millis(config.snapshot.debounce_ms);

    // A missing snapshot at startup is not fatal; the host may not have
    // written one yet.
    match load_snapshot(&config.snapshot.path) {
        Ok(snapshot) => {
            let _ = controller.sync(&snapshot);
        }
        Err(e) => tracing::warn!("No initial snapshot: {}", e),
    }

    let (watcher, mut updates) = SnapshotWatcher::new(&config.snapshot.path);
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(snapshot) = update else { break };
                let snapshot = settle(&mut updates, snapshot, debounce).await;
                let _ = controller.sync(&snapshot);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

/// Wait out a burst of changes and keep only the newest snapshot.
async fn settle(
    updates: &mut mpsc::UnboundedReceiver<Snapshot>,
    mut latest: Snapshot,
    debounce: Duration,
) -> Snapshot {
    tokio::time::sleep(debounce).await;
    while let Ok(snapshot) = updates.try_recv() {
        latest = snapshot;
    }
    latest
}
