//! Error types for the chain-side state machines.
//!
//! Every failure is terminal for the triggering call; nothing here retries.

use a721_core::types::{ChainId, ItemId};
use thiserror::Error;

use crate::registry::Role;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    // ========================================================================
    // Authorization
    // ========================================================================

    #[error("Unauthorized: only admin can perform this action")]
    Unauthorized,

    #[error("Only gateway can execute redeem")]
    OnlyGateway,

    #[error("Account is missing role {role}")]
    MissingRole { role: Role },

    #[error("Caller is neither owner nor approved")]
    NotAuthorized,

    // ========================================================================
    // Swap gates
    // ========================================================================

    #[error("Swap to an unsupported chain: {chain_id}")]
    UnsupportedChain { chain_id: ChainId },

    #[error("Caller is not owner")]
    NotOwner,

    #[error("Bridge is paused")]
    Paused,

    // ========================================================================
    // Redemption
    // ========================================================================

    #[error("ECDSA: invalid signature")]
    InvalidSignature,

    #[error("Insufficient signatures: got {got}, need {required}")]
    InsufficientSignatures { got: usize, required: usize },

    #[error("Can't redeem twice")]
    AlreadyRedeemed,

    /// The protocol's own bookkeeping was violated, e.g. an unlock for an
    /// item the bridge does not hold. Fail-closed; the message hash stays
    /// consumed.
    #[error("Protocol violation: {reason}")]
    ProtocolViolation { reason: String },

    // ========================================================================
    // Asset registry
    // ========================================================================

    #[error("Item not found: {item_id}")]
    NotFound { item_id: ItemId },

    #[error("Mint or transfer to the zero address")]
    InvalidRecipient,

    #[error("Item already exists: {item_id}")]
    AlreadyExists { item_id: ItemId },

    #[error("Id range exhausted for this chain")]
    IdSpaceExhausted,
}
