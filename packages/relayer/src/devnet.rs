//! Local devnet wiring.
//!
//! Spins up one in-process ledger per configured chain id, mutually
//! allow-listed and administered by the gateway account, so the binary is
//! exercisable end to end without any external node. Production
//! deployments would replace this with clients for real ledgers.

use std::sync::Arc;

use eyre::{Result, WrapErr};
use tracing::info;

use a721_chain::{Call, ChainClient, Ledger, LedgerConfig, Transaction};
use a721_core::signer::SignerSet;
use a721_core::types::ChainId;

use alloy::primitives::Address;

/// Build mutually-linked in-process chains.
pub fn spawn_chains(chain_ids: &[u64], admin: Address) -> Result<Vec<Arc<dyn ChainClient>>> {
    let signers = SignerSet::single(admin);

    let ledgers: Vec<Arc<Ledger>> = chain_ids
        .iter()
        .map(|&id| {
            Arc::new(Ledger::new(LedgerConfig {
                chain_id: ChainId(id),
                admin,
                gateway_caller: admin,
                signers: signers.clone(),
            }))
        })
        .collect();

    // Every chain accepts swaps toward every other chain.
    for ledger in &ledgers {
        for &other in chain_ids {
            if ChainId(other) == ledger.chain_id() {
                continue;
            }
            ledger
                .execute(Transaction {
                    sender: admin,
                    call: Call::AddChain { chain_id: ChainId(other) },
                })
                .wrap_err_with(|| {
                    format!("Failed to allow-list chain {other} on chain {}", ledger.chain_id())
                })?;
        }
        info!(
            chain_id = %ledger.chain_id(),
            bridge = %ledger.bridge_account(),
            "Devnet chain ready"
        );
    }

    Ok(ledgers.into_iter().map(|l| l as Arc<dyn ChainClient>).collect())
}
