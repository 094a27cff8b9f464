//! Chain and item identifiers.
//!
//! Item ids are range-partitioned: every chain mints into its own block of
//! `RANGE_UNIT` ids, so ids stay globally unique without any cross-chain
//! coordination. Which chain an item calls home is derived from the id
//! itself, never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of each chain's id range. A chain with id `c` mints item ids in
/// `[c * RANGE_UNIT, (c + 1) * RANGE_UNIT)`.
pub const RANGE_UNIT: u64 = 10_000;

/// Identifier of a ledger participating in the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    pub fn new(id: u64) -> Self {
        ChainId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        ChainId(id)
    }
}

/// Chain-qualified asset identifier.
///
/// `id = home_chain * RANGE_UNIT + sequence`, where `sequence` is the minting
/// chain's monotonically increasing counter starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Compose an id from its home chain and per-chain sequence number.
    ///
    /// Callers are responsible for keeping `sequence < RANGE_UNIT`; the
    /// registry enforces this at mint time.
    pub fn from_parts(home: ChainId, sequence: u64) -> Self {
        ItemId(home.0 * RANGE_UNIT + sequence)
    }

    /// The chain this item was originally minted on, derived structurally
    /// from the id's range. Pure function of the id, independent of any
    /// ledger state.
    pub fn home_chain(&self) -> ChainId {
        ChainId(self.0 / RANGE_UNIT)
    }

    /// Position of this item within its home chain's range.
    pub fn sequence(&self) -> u64 {
        self.0 % RANGE_UNIT
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id)
    }
}
