//! Relayer-internal types.

use alloy::primitives::{Address, B256};

use a721_core::types::{ChainId, ItemId};

/// A `SwapInitialized` event observed on a source chain, queued for
/// settlement on its destination.
#[derive(Debug, Clone)]
pub struct ObservedSwap {
    pub chain_from: ChainId,
    pub chain_to: ChainId,
    pub item_id: ItemId,
    pub swapper: Address,
    pub to: Address,
    pub uri: String,
    /// Log position of the event on the source chain.
    pub seq: u64,
    /// Hash of the originating transaction.
    pub tx_hash: B256,
}
