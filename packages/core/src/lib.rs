//! A721-Core: Shared Protocol Library for the A721 Bridge
//!
//! This crate provides the pieces every bridge participant has to agree on:
//!
//! - **Identifiers** - `ChainId` and the range-partitioned `ItemId` scheme
//! - **Hashing** - the deterministic message hash that binds a swap's
//!   parameters, recomputed bit-for-bit by the source chain, the relayer,
//!   and the destination chain
//! - **Trust configuration** - the authorized signer set and the gateway
//!   signing key wrapper
//! - **Events** - the per-chain event log entries the relayer consumes
//!
//! State machines live in `a721-chain`; the relayer service in
//! `a721-relayer`. Neither can disagree with the other about anything
//! defined here.

pub mod event;
pub mod hash;
pub mod signer;
pub mod types;

pub use event::{ChainEvent, LoggedEvent};
pub use hash::{compute_message_hash, keccak256};
pub use signer::{GatewaySigner, SignerSet, SignerSetError, VerifyError};
pub use types::{ChainId, ItemId, RANGE_UNIT};
