//! A721 Bridge Relayer.
//!
//! Bridges the event streams of N independent chains: one watcher task per
//! chain observes `SwapInitialized` events and feeds them over a channel to
//! a submitter that signs each message hash with the gateway key and
//! submits the matching `redeem` on the destination chain.
//!
//! The relayer holds no persistent state. Watcher cursors live in memory;
//! after a crash and restart every event is re-observed and re-submitted,
//! and the destination bridge's replay protection turns the duplicates
//! into no-ops. Correctness never depends on the relayer remembering what
//! it already delivered.

pub mod api;
pub mod config;
pub mod devnet;
pub mod metrics;
pub mod service;
pub mod types;
pub mod watchers;
pub mod writers;

pub use config::Config;
pub use service::{RelayerOptions, RelayerService};
pub use types::ObservedSwap;
