//! Per-chain event log entries.
//!
//! Chains emit events into an append-only log; the relayer reads the log
//! from a cursor and reacts to `SwapInitialized`. The registry's
//! transfer/approval events are part of the log too, which is what lets
//! tests distinguish an unlock (transfer out of the bridge account) from a
//! mint (transfer out of the zero account).

use alloy::primitives::{Address, B256};

use crate::types::{ChainId, ItemId};

/// An event emitted by a chain's bridge or asset registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    ChainAdded {
        chain_id: ChainId,
        admin: Address,
    },
    ChainRemoved {
        chain_id: ChainId,
        admin: Address,
    },
    SwapInitialized {
        item_id: ItemId,
        chain_to: ChainId,
        chain_from: ChainId,
        swapper: Address,
        to: Address,
        uri: String,
    },
    SwapRedeemed {
        message_hash: B256,
        item_id: ItemId,
        chain_from: ChainId,
        to: Address,
    },
    /// Registry ownership change. Mints transfer from the zero address,
    /// burns transfer to it.
    Transfer {
        from: Address,
        to: Address,
        item_id: ItemId,
    },
    Approval {
        owner: Address,
        spender: Address,
        item_id: ItemId,
    },
    ApprovalForAll {
        owner: Address,
        operator: Address,
        approved: bool,
    },
}

impl ChainEvent {
    /// Short name for logging and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ChainEvent::ChainAdded { .. } => "chain_added",
            ChainEvent::ChainRemoved { .. } => "chain_removed",
            ChainEvent::SwapInitialized { .. } => "swap_initialized",
            ChainEvent::SwapRedeemed { .. } => "swap_redeemed",
            ChainEvent::Transfer { .. } => "transfer",
            ChainEvent::Approval { .. } => "approval",
            ChainEvent::ApprovalForAll { .. } => "approval_for_all",
        }
    }
}

/// An event as recorded in a chain's log: position, the including
/// transaction's hash, and the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
    /// Position in the chain's append-only log, starting at 0.
    pub seq: u64,
    /// Hash of the transaction that emitted this event.
    pub tx_hash: B256,
    pub event: ChainEvent,
}
