//! The ledger interface the relayer programs against.
//!
//! A chain, from the relayer's point of view, is just two primitives:
//! submit a transaction and wait for its inclusion, and read the event log
//! from a cursor. The in-process [`Ledger`](crate::ledger::Ledger)
//! implements this; tests substitute fakes to inject transport failures.

use async_trait::async_trait;
use thiserror::Error;

use a721_core::event::LoggedEvent;
use a721_core::types::ChainId;

use crate::error::ContractError;
use crate::ledger::{Transaction, TxOutcome};

/// Failure submitting a transaction or reading the log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The chain included and rejected the transaction. Terminal for this
    /// submission; resubmitting the same transaction returns the same
    /// error.
    #[error("transaction rejected: {0}")]
    Rejected(#[from] ContractError),

    /// The chain could not be reached or the submission was lost in
    /// transit. Retryable; redemption is idempotent on the destination.
    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    fn chain_id(&self) -> ChainId;

    /// Read the event log starting at `cursor` (a log sequence number).
    /// Returns every event with `seq >= cursor`, in order.
    async fn events_since(&self, cursor: u64) -> Result<Vec<LoggedEvent>, SubmitError>;

    /// Submit a transaction and wait for inclusion.
    async fn submit(&self, tx: Transaction) -> Result<TxOutcome, SubmitError>;
}
