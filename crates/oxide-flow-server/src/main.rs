//! oxide-flow demo server.

use std::time::Duration;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_flow_server::{demo, serve, ListenAddr, ServerConfig};

/// Demo server for oxide-flow routing.
#[derive(Parser)]
#[command(name = "oxide-flow-demo")]
#[command(about = "Serve the oxide-flow demo routes", long_about = None)]
struct Cli {
    /// Listen address: "8080", ":8080", or "127.0.0.1:8080".
    #[arg(short, long, env = "OXIDE_FLOW_PORT", default_value = ":8080")]
    port: String,

    /// Seconds to wait for open connections on shutdown.
    #[arg(long, default_value_t = 5)]
    shutdown_timeout: u64,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ServerConfig::new(ListenAddr::parse(&cli.port)?)
        .with_shutdown_timeout(Duration::from_secs(cli.shutdown_timeout));
    let router = demo::router()?;

    info!(address = %config.addr, "starting oxide-flow demo");
    serve(router, &config).await?;
    info!("server stopped");

    Ok(())
}
