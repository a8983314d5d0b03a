//! CoinPayments Gateway Server
//!
//! A headless payment-gateway adapter bridging a billing platform to the
//! CoinPayments checkout and webhook APIs.

mod api;
mod config;
mod ledger;
mod server;
mod shutdown;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::FileConfig;
use ledger::TracingLedger;
use server::{build_router, run_server};
use state::AppState;

/// CoinPayments Gateway - headless billing payment adapter
#[derive(Parser, Debug)]
#[command(name = "cpgw-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./cpgw-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting cpgw-server v{}", env!("CARGO_PKG_VERSION"));

    let file_config = FileConfig::load(&args.config).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    let listen_addr = args.listen.unwrap_or(file_config.server.listen);
    tracing::info!("Configuration loaded from {:?}", args.config);

    let gateway_config = Arc::new(file_config.into_gateway_config().map_err(|e| {
        tracing::error!("Invalid gateway configuration: {}", e);
        e
    })?);
    tracing::info!(
        webhooks = gateway_config.credentials.webhooks_enabled,
        company_id = %gateway_config.company_id,
        "Gateway configured"
    );

    let state = AppState::new(gateway_config, Arc::new(TracingLedger)).map_err(|e| {
        tracing::error!("Failed to build the processor HTTP client: {}", e);
        e
    })?;
    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", listen_addr);
    run_server(router, listen_addr).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
