//! Per-chain swap watcher.
//!
//! Polls one chain's event log from an in-memory cursor and queues every
//! `SwapInitialized` for the submitter. The cursor is deliberately not
//! persisted: after a restart the log is re-read from the beginning and
//! the destination's replay protection absorbs the redeliveries.

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use a721_chain::ChainClient;
use a721_core::event::ChainEvent;
use a721_core::types::ChainId;

use crate::metrics;
use crate::types::ObservedSwap;

pub struct SwapWatcher {
    client: Arc<dyn ChainClient>,
    queue: mpsc::Sender<ObservedSwap>,
    poll_interval: Duration,
}

impl SwapWatcher {
    pub fn new(
        client: Arc<dyn ChainClient>,
        queue: mpsc::Sender<ObservedSwap>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            queue,
            poll_interval,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.client.chain_id()
    }

    /// Run the watcher loop.
    pub async fn run(self) -> Result<()> {
        let chain = self.client.chain_id();
        let chain_label = chain.to_string();
        let mut cursor: u64 = 0;

        info!(chain_id = %chain, "Swap watcher started");

        loop {
            match self.client.events_since(cursor).await {
                Ok(events) => {
                    for entry in events {
                        cursor = entry.seq + 1;
                        metrics::WATCHER_CURSOR
                            .with_label_values(&[&chain_label])
                            .set(cursor as f64);

                        let ChainEvent::SwapInitialized {
                            item_id,
                            chain_to,
                            chain_from,
                            swapper,
                            to,
                            uri,
                        } = entry.event
                        else {
                            continue;
                        };

                        info!(
                            chain_id = %chain,
                            item_id = %item_id,
                            chain_to = %chain_to,
                            swapper = %swapper,
                            to = %to,
                            tx_hash = %entry.tx_hash,
                            "Swap initialized"
                        );
                        metrics::SWAPS_OBSERVED.with_label_values(&[&chain_label]).inc();

                        let observed = ObservedSwap {
                            chain_from,
                            chain_to,
                            item_id,
                            swapper,
                            to,
                            uri,
                            seq: entry.seq,
                            tx_hash: entry.tx_hash,
                        };
                        if self.queue.send(observed).await.is_err() {
                            return Err(eyre::eyre!("swap queue closed"));
                        }
                    }
                }
                Err(e) => {
                    warn!(chain_id = %chain, error = %e, "Failed to read event log");
                    metrics::ERRORS
                        .with_label_values(&[&chain_label, "event_log"])
                        .inc();
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
