//! SPA edge functions (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 EDGE (CloudFront)            │
//!   Viewer request     │                                              │
//!   ───────────────────┼─▶ behavior ─▶ origin-request ──────────────┐ │
//!                      │   (routing)   (redirect: /m/{a}/{b}/{c}/…)  │ │
//!                      │                    │ 301                    ▼ │
//!   Viewer response    │                    ▼                  ┌──────┐│
//!   ◀──────────────────┼──────────── origin-response ◀─────────│origin││
//!                      │             (rewrite: 403/404 → index)└──────┘│
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! # Modes
//! - `lambda <trigger>`: Lambda@Edge runtime for one trigger
//! - `serve`: local emulator (Axum) forwarding to configured origins
//! - `invoke <trigger> --event FILE`: run one event through a trigger

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use spa_edge::config::{load_config, ConfigWatcher, EdgeConfig, LogFormat};
use spa_edge::edge::EdgeEvent;
use spa_edge::lifecycle::{spawn_signal_listener, Shutdown};
use spa_edge::observability::{logging, metrics};
use spa_edge::{lambda, EdgeHandlers, EdgeServer, Trigger};

#[derive(Parser)]
#[command(name = "spa-edge")]
#[command(about = "CloudFront edge functions for a single-page application", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local edge emulator
    Serve {
        /// Reload handlers when the configuration file changes
        #[arg(long)]
        watch: bool,
    },
    /// Run as a Lambda@Edge function
    Lambda {
        #[arg(value_enum)]
        trigger: Trigger,
    },
    /// Run a single event file through a trigger and print the result
    Invoke {
        #[arg(value_enum)]
        trigger: Trigger,

        #[arg(short, long)]
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };

    if matches!(cli.command, Commands::Lambda { .. }) {
        config.observability.log_format = LogFormat::Json;
    }
    logging::init_tracing(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "spa-edge starting");

    match cli.command {
        Commands::Lambda { trigger } => lambda::run(trigger, &config).await,
        Commands::Invoke { trigger, event } => {
            let content = tokio::fs::read_to_string(&event).await?;
            let event: EdgeEvent = serde_json::from_str(&content)?;
            let handlers = EdgeHandlers::from_config(&config)?;
            let result = handlers.dispatch(trigger, event).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Serve { watch } => serve(config, cli.config, watch).await,
    }
}

async fn serve(
    config: EdgeConfig,
    path: Option<PathBuf>,
    watch: bool,
) -> Result<(), lambda_runtime::Error> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        behaviors = config.behaviors.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must stay alive for the lifetime of the server.
    let mut _watcher = None;
    let updates = match (watch, path) {
        (true, Some(path)) => {
            let (watcher, updates) = ConfigWatcher::new(&path);
            _watcher = Some(watcher.run()?);
            tracing::info!(path = %path.display(), "Watching configuration");
            Some(updates)
        }
        (true, None) => {
            tracing::warn!("--watch requires --config; hot reload disabled");
            None
        }
        (false, _) => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = EdgeServer::new(config)?;
    server.run(listener, updates, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
