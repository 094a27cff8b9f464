use std::net::SocketAddr;

use tracing::{info, warn};

use a721_core::signer::GatewaySigner;
use a721_relayer::{api, config::Config, devnet, RelayerOptions, RelayerService};

fn main() -> eyre::Result<()> {
    // Install color-eyre for better error reporting
    color_eyre::install()?;

    // Run the async main
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    info!("Starting A721 Bridge Relayer");

    let config = Config::load()?;
    info!(chain_ids = ?config.chain_ids, "Configuration loaded");

    let signer = match &config.gateway_private_key {
        Some(key) => GatewaySigner::from_hex(key)?,
        None => {
            warn!("GATEWAY_PRIVATE_KEY not set, generated an ephemeral devnet key");
            GatewaySigner::random()
        }
    };
    info!(gateway = %signer.address(), "Gateway signer ready");

    let clients = devnet::spawn_chains(&config.chain_ids, signer.address())?;

    // Start the health/metrics server
    let api_addr = SocketAddr::from(([0, 0, 0, 0], config.health_port));
    tokio::spawn(async move {
        if let Err(e) = api::start_api_server(api_addr).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    // Create shutdown channel and signal handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(()).await;
    });

    let options = RelayerOptions {
        poll_interval: config.poll_interval(),
        channel_capacity: config.channel_capacity,
        retry: config.retry_config(),
    };
    RelayerService::new(clients, signer, options)
        .run(shutdown_rx)
        .await?;

    info!("A721 Bridge Relayer stopped");
    Ok(())
}

/// Initialize tracing/logging with structured output.
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,a721_relayer=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Wait for shutdown signals (SIGINT/SIGTERM).
async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}
