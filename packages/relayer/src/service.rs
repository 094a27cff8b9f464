//! Service wiring: watchers feeding the submitter over a bounded channel.

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{error, info};

use a721_chain::ChainClient;
use a721_core::signer::GatewaySigner;

use crate::watchers::WatcherManager;
use crate::writers::{RedeemSubmitter, RetryConfig};

/// Tunables for a relayer instance.
#[derive(Debug, Clone)]
pub struct RelayerOptions {
    pub poll_interval: Duration,
    pub channel_capacity: usize,
    pub retry: RetryConfig,
}

impl Default for RelayerOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            channel_capacity: 256,
            retry: RetryConfig::default(),
        }
    }
}

/// The relayer: one watcher per configured chain, one submitter, one
/// gateway signing identity shared by every participating bridge.
pub struct RelayerService {
    clients: Vec<Arc<dyn ChainClient>>,
    signer: GatewaySigner,
    options: RelayerOptions,
}

impl RelayerService {
    pub fn new(
        clients: Vec<Arc<dyn ChainClient>>,
        signer: GatewaySigner,
        options: RelayerOptions,
    ) -> Self {
        Self {
            clients,
            signer,
            options,
        }
    }

    /// Run watchers and submitter until shutdown or failure.
    pub async fn run(self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        let (queue_tx, queue_rx) = mpsc::channel(self.options.channel_capacity);

        let watcher_manager =
            WatcherManager::new(&self.clients, queue_tx, self.options.poll_interval);
        let submitter = RedeemSubmitter::new(
            self.clients.iter().cloned(),
            self.signer,
            self.options.retry,
        );

        // Fan the single shutdown signal out to both halves.
        let (watcher_shutdown_tx, watcher_shutdown_rx) = mpsc::channel::<()>(1);
        let (submitter_shutdown_tx, submitter_shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            let _ = watcher_shutdown_tx.send(()).await;
            let _ = submitter_shutdown_tx.send(()).await;
        });

        info!("Relayer service started");

        tokio::select! {
            result = watcher_manager.run(watcher_shutdown_rx) => {
                if let Err(e) = result {
                    error!(error = %e, "Watcher manager error");
                    return Err(e);
                }
            }
            result = submitter.run(queue_rx, submitter_shutdown_rx) => {
                if let Err(e) = result {
                    error!(error = %e, "Submitter error");
                    return Err(e);
                }
            }
        }

        info!("Relayer service stopped");
        Ok(())
    }
}
