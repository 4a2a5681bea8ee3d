use bus::{BusReceiver, EventBus};
use cb_config::NodeConfig;
use cb_net::NetworkAssembly;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// The event bus: the broker process that every client and the auth
/// server connect to.
#[derive(Parser)]
#[command(version, about = "Event bus broker")]
struct Cli {
    /// Path to the node's key=value configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "bus starting");

    let config = match &cli.config {
        Some(path) => cb_config::load_node_config(path),
        None => Ok(NodeConfig::default()),
    }
    .unwrap_or_else(|e| {
        eprintln!("FATAL: failed to load config: {e}");
        std::process::exit(1);
    });

    let security = cb_crypto::keyfile::load_or_generate(&config.private_key_path).unwrap_or_else(|e| {
        eprintln!("FATAL: failed to load or generate key pair: {e}");
        std::process::exit(1);
    });
    let own_public_key = security.public_key_bytes().unwrap_or_else(|e| {
        eprintln!("FATAL: failed to encode own public key: {e}");
        std::process::exit(1);
    });

    let mut assembly = NetworkAssembly::new(Arc::new(security));
    let event_bus = EventBus::new(own_public_key);
    let receiver = BusReceiver::new(event_bus, assembly.outbound());

    let bound_port = assembly
        .start(&config.host, config.port_in, receiver)
        .await
        .unwrap_or_else(|e| {
            eprintln!("FATAL: failed to bind listener on {}:{}: {e}", config.host, config.port_in);
            std::process::exit(1);
        });
    info!(host = %config.host, port = bound_port, "bus listening");

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => eprintln!("failed to listen for shutdown signal: {e}"),
    }
    assembly.stop().await;
}
