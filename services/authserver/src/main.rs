use authserver::{AuthServerReceiver, UserRepository};
use cb_config::NodeConfig;
use cb_net::NetworkAssembly;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Auth/state server: registration, login, and user directory")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where the persisted user directory lives.
    #[arg(long, default_value = "./users.json")]
    users_file: PathBuf,
    /// The Event Bus's public key file, needed to forward subscriptions
    /// and chat traffic onward.
    #[arg(long, default_value = "./bus.key.pem.pub")]
    bus_public_key: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "authserver starting");

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

    let bus_public_key = cb_crypto::keyfile::load_public_key(&cli.bus_public_key).unwrap_or_else(|e| {
        eprintln!("FATAL: failed to load bus public key from {}: {e}", cli.bus_public_key.display());
        std::process::exit(1);
    });

    let repo = Arc::new(UserRepository::load(&cli.users_file).unwrap_or_else(|e| {
        eprintln!("FATAL: failed to load user directory: {e}");
        std::process::exit(1);
    }));

    let mut assembly = NetworkAssembly::new(Arc::new(security));
    let receiver = AuthServerReceiver::new(repo, assembly.outbound(), config.bus_port_in, bus_public_key);

    let bound_port = assembly
        .start(&config.host, config.server_port_in, receiver)
        .await
        .unwrap_or_else(|e| {
            eprintln!("FATAL: failed to start network assembly: {e}");
            std::process::exit(1);
        });
    info!(host = %config.host, port = bound_port, "authserver listening");

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => eprintln!("failed to listen for shutdown signal: {e}"),
    }
    assembly.stop().await;
}
