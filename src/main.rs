// ZEN Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | ZEN

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;

use zen_core::config::Config;
use zen_core::server::{self, ServerState};

#[derive(Parser)]
#[command(name = "zen-core")]
#[command(about = "ZEN ASMR Session Composer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the session HTTP API
    Serve {
        /// Address to bind (defaults to ZEN_HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to run the server on (defaults to ZEN_PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Compose one session and print it as JSON
    Compose {
        /// Mood theme, e.g. "ocean" or "rainy library"
        #[arg(short, long)]
        theme: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Global panic handler: log panics instead of crashing silently
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        tracing::error!("🚨 [ZEN PANIC] at {}: {}", location, message);
    }));

    info!("--- ZEN SESSION COMPOSER v{} ---", env!("CARGO_PKG_VERSION"));

    let args = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;
    let composer = config.composer().context("failed to initialize provider")?;

    match args.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            let addr = Config::bind_addr(&host, port).context("invalid bind address")?;

            let static_dir = if config.static_dir.is_dir() {
                info!("📁 Serving static assets from {}", config.static_dir.display());
                Some(config.static_dir.clone())
            } else {
                info!("No static directory at {}; running API-only", config.static_dir.display());
                None
            };

            let state = Arc::new(ServerState::new(composer, static_dir));
            server::start_server(addr, state).await?;
        }
        Commands::Compose { theme } => {
            let session = composer.create_session(&theme).await;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
    }

    Ok(())
}
