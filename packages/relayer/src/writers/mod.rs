//! Redeem submission.
//!
//! The submitter drains the observed-swap queue, recomputes each swap's
//! message hash bit-for-bit, signs it with the gateway key, and submits
//! `redeem` on the destination chain.

use std::collections::HashMap;
use std::sync::Arc;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use a721_chain::{Call, ChainClient, Transaction};
use a721_core::hash::compute_message_hash;
use a721_core::signer::GatewaySigner;
use a721_core::types::ChainId;

use crate::metrics;
use crate::types::ObservedSwap;

pub mod retry;

pub use retry::{classify, ErrorClass, RetryConfig};

/// Signs attestations and submits redemptions, routing each observed swap
/// to its destination chain.
pub struct RedeemSubmitter {
    clients: HashMap<ChainId, Arc<dyn ChainClient>>,
    signer: GatewaySigner,
    retry: RetryConfig,
}

impl RedeemSubmitter {
    pub fn new(
        clients: impl IntoIterator<Item = Arc<dyn ChainClient>>,
        signer: GatewaySigner,
        retry: RetryConfig,
    ) -> Self {
        let clients: HashMap<ChainId, Arc<dyn ChainClient>> = clients
            .into_iter()
            .map(|client| (client.chain_id(), client))
            .collect();
        info!(
            chains = clients.len(),
            gateway = %signer.address(),
            "Redeem submitter created"
        );
        Self {
            clients,
            signer,
            retry,
        }
    }

    /// Drain the queue until shutdown or until every watcher is gone.
    pub async fn run(
        self,
        mut queue: mpsc::Receiver<ObservedSwap>,
        mut shutdown: mpsc::Receiver<()>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutdown signal received, stopping submitter");
                    return Ok(());
                }
                maybe_swap = queue.recv() => {
                    match maybe_swap {
                        Some(swap) => self.settle(swap).await,
                        None => {
                            info!("Swap queue closed, stopping submitter");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Settle one observed swap on its destination chain.
    async fn settle(&self, swap: ObservedSwap) {
        let dest_label = swap.chain_to.to_string();

        let Some(dest) = self.clients.get(&swap.chain_to) else {
            error!(
                chain_to = %swap.chain_to,
                item_id = %swap.item_id,
                "No client configured for destination chain, dropping swap"
            );
            metrics::ERRORS
                .with_label_values(&[&dest_label, "unknown_destination"])
                .inc();
            return;
        };

        // The exact hash the destination bridge verifies; must match the
        // source bridge's computation bit-for-bit.
        let message_hash = compute_message_hash(
            swap.item_id,
            swap.chain_to,
            swap.chain_from,
            &swap.swapper,
            &swap.to,
            &swap.uri,
        );

        let signature = match self.signer.sign_message_hash(&message_hash) {
            Ok(signature) => signature,
            Err(e) => {
                error!(error = %e, message_hash = %message_hash, "Failed to sign message hash");
                metrics::ERRORS.with_label_values(&[&dest_label, "signing"]).inc();
                return;
            }
        };

        let tx = Transaction {
            sender: self.signer.address(),
            call: Call::Redeem {
                message_hash,
                signatures: vec![signature],
                item_id: swap.item_id,
                uri: swap.uri.clone(),
                to: swap.to,
                chain_from: swap.chain_from,
            },
        };

        let mut attempt: u32 = 0;
        loop {
            match dest.submit(tx.clone()).await {
                Ok(outcome) => {
                    info!(
                        chain_to = %swap.chain_to,
                        item_id = %swap.item_id,
                        message_hash = %message_hash,
                        source_tx = %swap.tx_hash,
                        source_seq = swap.seq,
                        tx_hash = %outcome.tx_hash,
                        "Redeem submitted"
                    );
                    metrics::REDEEMS_SUBMITTED
                        .with_label_values(&[&dest_label, "confirmed"])
                        .inc();
                    return;
                }
                Err(e) => match classify(&e) {
                    ErrorClass::AlreadySettled => {
                        // Duplicate delivery; the transfer is already done.
                        debug!(
                            chain_to = %swap.chain_to,
                            message_hash = %message_hash,
                            "Message hash already redeemed"
                        );
                        metrics::REDEEMS_SUBMITTED
                            .with_label_values(&[&dest_label, "duplicate"])
                            .inc();
                        return;
                    }
                    ErrorClass::Transient => {
                        if !self.retry.should_retry(attempt) {
                            error!(
                                chain_to = %swap.chain_to,
                                item_id = %swap.item_id,
                                error = %e,
                                attempts = attempt + 1,
                                "Giving up on redeem after transient failures"
                            );
                            metrics::REDEEMS_SUBMITTED
                                .with_label_values(&[&dest_label, "failed"])
                                .inc();
                            return;
                        }
                        let backoff = self.retry.backoff_for_attempt(attempt);
                        warn!(
                            chain_to = %swap.chain_to,
                            error = %e,
                            attempt,
                            backoff_ms = backoff.as_millis() as u64,
                            "Transient failure submitting redeem, backing off"
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                    }
                    ErrorClass::Fatal => {
                        // A rejected redemption with a valid queue entry
                        // means the gateway key or caller account does not
                        // match the destination's configuration. Retrying
                        // cannot help.
                        error!(
                            chain_to = %swap.chain_to,
                            item_id = %swap.item_id,
                            error = %e,
                            "Redeem rejected by destination, not retrying"
                        );
                        metrics::REDEEMS_SUBMITTED
                            .with_label_values(&[&dest_label, "rejected"])
                            .inc();
                        return;
                    }
                },
            }
        }
    }
}
