use cb_config::NodeConfig;
use cb_net::NetworkAssembly;
use cb_protocol::{event_type, Content, Packet};
use clap::Parser;
use client::{ClientReceiver, StdoutPresenter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// A thin terminal chat client: logs in (or registers) against the auth
/// server, then relays stdin lines to the bus as `MESSAGE` events and
/// prints whatever the pipeline delivers back.
#[derive(Parser)]
#[command(version, about = "Chatbus terminal client")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    username: String,
    /// Account password. Prompted for interactively (without echo) when
    /// omitted — passing it here leaves it visible in the process list
    /// and shell history.
    #[arg(long)]
    password: Option<String>,
    /// Register a new account instead of logging into an existing one.
    #[arg(long)]
    register: bool,
    #[arg(long, default_value = "white")]
    color: String,
    /// The auth server's public key file, needed to send `LOGIN`/`REGISTER`.
    #[arg(long, default_value = "./server.key.pem.pub")]
    server_public_key: PathBuf,
    /// The bus's public key file, needed to send `MESSAGE` directly.
    #[arg(long, default_value = "./bus.key.pem.pub")]
    bus_public_key: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut cli = Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "client starting");

    let password = match cli.password.take() {
        Some(password) => password,
        None => rpassword::prompt_password("password: ").unwrap_or_else(|e| {
            eprintln!("FATAL: failed to read password: {e}");
            std::process::exit(1);
        }),
    };

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

    let server_public_key = cb_crypto::keyfile::load_public_key(&cli.server_public_key).unwrap_or_else(|e| {
        eprintln!("FATAL: failed to load server public key from {}: {e}", cli.server_public_key.display());
        std::process::exit(1);
    });
    let bus_public_key = cb_crypto::keyfile::load_public_key(&cli.bus_public_key).unwrap_or_else(|e| {
        eprintln!("FATAL: failed to load bus public key from {}: {e}", cli.bus_public_key.display());
        std::process::exit(1);
    });

    let mut assembly = NetworkAssembly::new(Arc::new(security));
    let presenter = Arc::new(StdoutPresenter);
    let receiver = ClientReceiver::new(presenter);

    let bound_port = assembly
        .start(&config.host, config.port_in, receiver)
        .await
        .unwrap_or_else(|e| {
            eprintln!("FATAL: failed to bind listener on {}:{}: {e}", config.host, config.port_in);
            std::process::exit(1);
        });
    info!(host = %config.host, port = bound_port, "client listening");

    let auth_type = if cli.register { event_type::REGISTER } else { event_type::LOGIN };
    let auth_content = Content::map([
        ("username", Content::str(cli.username.clone())),
        ("password", Content::str(password)),
        ("color", Content::str(cli.color)),
    ]);
    let auth_packet = Packet::new(auth_type, auth_content)
        .with_origin(cli.username.clone())
        .with_host(config.host.clone())
        .with_origin_port(bound_port)
        .with_dest_port(config.server_port_in)
        .with_origin_public_key(own_public_key);
    assembly.send(auth_packet, server_public_key).await;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(text)) if text == "/quit" => break,
                    Ok(Some(text)) => {
                        let message = Packet::new(event_type::MESSAGE, Content::str(text))
                            .with_origin(cli.username.clone())
                            .with_destination(event_type::ALL)
                            .with_host(config.host.clone())
                            .with_origin_port(bound_port)
                            .with_dest_port(config.bus_port_in);
                        assembly.send(message, bus_public_key.clone()).await;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        eprintln!("stdin read error: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }
    assembly.stop().await;
}
