use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use a721_chain::ChainClient;

use crate::types::ObservedSwap;

pub mod swap;

pub use swap::SwapWatcher;

/// Manages one swap watcher per configured chain.
pub struct WatcherManager {
    watchers: Vec<SwapWatcher>,
}

impl WatcherManager {
    pub fn new(
        clients: &[Arc<dyn ChainClient>],
        queue: mpsc::Sender<ObservedSwap>,
        poll_interval: Duration,
    ) -> Self {
        let watchers = clients
            .iter()
            .map(|client| SwapWatcher::new(client.clone(), queue.clone(), poll_interval))
            .collect::<Vec<_>>();

        // Detect duplicate watchers (misconfiguration where the same chain
        // id appears twice in the client list)
        let mut seen_chain_ids = std::collections::HashMap::new();
        for watcher in &watchers {
            *seen_chain_ids.entry(watcher.chain_id()).or_insert(0u32) += 1;
        }
        for (&chain_id, &count) in &seen_chain_ids {
            if count > 1 {
                warn!(
                    %chain_id,
                    count,
                    "Duplicate watcher for chain; each event will be observed {} times",
                    count
                );
            }
        }

        info!(
            watchers = watchers.len(),
            chain_ids = ?seen_chain_ids.keys().collect::<Vec<_>>(),
            "Watcher manager created"
        );
        Self { watchers }
    }

    /// Run all watchers concurrently.
    /// Returns when any watcher fails or the shutdown signal is received.
    pub async fn run(self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        let mut join_set = tokio::task::JoinSet::new();

        for watcher in self.watchers {
            join_set.spawn(async move { watcher.run().await });
        }

        tokio::select! {
            _ = shutdown.recv() => {
                info!("Shutdown signal received, stopping watchers");
                join_set.abort_all();
                Ok(())
            }
            maybe_done = join_set.join_next() => {
                match maybe_done {
                    Some(Ok(Ok(()))) => {
                        error!("A watcher exited unexpectedly without error");
                        Err(eyre::eyre!("watcher exited unexpectedly"))
                    }
                    Some(Ok(Err(e))) => {
                        error!("A watcher stopped with error: {:?}", e);
                        Err(e)
                    }
                    Some(Err(e)) => {
                        error!("A watcher task panicked: {:?}", e);
                        Err(eyre::eyre!("watcher task panicked: {}", e))
                    }
                    None => {
                        error!("All watcher tasks exited unexpectedly");
                        Err(eyre::eyre!("all watcher tasks exited unexpectedly"))
                    }
                }
            }
        }
    }
}
