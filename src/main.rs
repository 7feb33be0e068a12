//! Studio site server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ request-id ─▶ trace ─▶ timeout ─▶ body limit
//!                                                   │
//!                                                   ▼
//!          ┌──────────── security chain ────────────────────────┐
//!          │ nonce ─▶ security headers ─▶ rate limit ─▶ CSRF    │
//!          └────────────────────────────────────────┬───────────┘
//!                                                   ▼
//!                                        routing (method + path)
//!                                 ┌─────────────────┼──────────────────┐
//!                                 ▼                 ▼                  ▼
//!                           pages (Tera)     /schedule-trial      /static
//!                                                   │
//!                                         validation ─▶ notify (SMTP)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use studio_site::config::load_config;
use studio_site::lifecycle::{signals, Shutdown};
use studio_site::observability::{logging, metrics};
use studio_site::HttpServer;

#[derive(Parser)]
#[command(name = "studio-site")]
#[command(about = "Studio marketing site and trial-class booking server", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, env = "SITE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        site = %config.site.name,
        bind_address = %config.listener.bind_address,
        trusted_origins = ?config.security.trusted_origins,
        rate_limit_max = config.rate_limit.max_requests,
        email_enabled = config.email.enabled,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::shutdown_on_ctrl_c(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
