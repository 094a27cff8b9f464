//! A721-Chain: per-chain state for the A721 bridge.
//!
//! One [`Ledger`] models one chain: an [`AssetRegistry`] (ownership,
//! metadata, capability roles) and a [`Bridge`] state machine (chain
//! allow-list, pause flag, swap initiation, signature-gated redemption,
//! replay protection), executed serially behind the chain's own lock.
//!
//! The relayer never touches these types directly; it talks to a chain
//! through the [`ChainClient`] trait, which exposes exactly the primitives
//! the protocol needs from a ledger: submit a transaction and wait for
//! inclusion, and read the event log from a cursor.

pub mod bridge;
pub mod client;
pub mod error;
pub mod ledger;
pub mod registry;

pub use bridge::Bridge;
pub use client::{ChainClient, SubmitError};
pub use error::ContractError;
pub use ledger::{Call, Ledger, LedgerConfig, Transaction, TxOutcome};
pub use registry::{AssetRegistry, Role};
