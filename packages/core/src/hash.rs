//! Message hash computation for cross-chain swaps.
//!
//! The message hash is the replay-protection key and the payload the gateway
//! signs. It binds every parameter of a swap in a fixed 32-byte-word layout
//! (abi.encode style), so the source bridge, the relayer, and the destination
//! bridge all arrive at the same digest from the event fields alone.

use alloy::primitives::{Address, B256};
use tiny_keccak::{Hasher, Keccak};

use crate::types::{ChainId, ItemId};

/// Compute keccak256 hash of data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute the message hash binding a swap's parameters:
///
/// keccak256(itemId || chainTo || chainFrom || swapper || to || keccak256(uri))
///
/// Scalars are encoded as 32-byte big-endian words, addresses left-padded to
/// 32 bytes, and the uri folded in as its own keccak256 to keep the preimage
/// fixed-width.
pub fn compute_message_hash(
    item_id: ItemId,
    chain_to: ChainId,
    chain_from: ChainId,
    swapper: &Address,
    to: &Address,
    uri: &str,
) -> B256 {
    // 6 words * 32 bytes = 192 bytes
    let mut data = [0u8; 192];

    // Word 0: itemId (uint256, big-endian in last 8 bytes)
    data[24..32].copy_from_slice(&item_id.as_u64().to_be_bytes());

    // Word 1: chainTo
    data[32 + 24..64].copy_from_slice(&chain_to.as_u64().to_be_bytes());

    // Word 2: chainFrom
    data[64 + 24..96].copy_from_slice(&chain_from.as_u64().to_be_bytes());

    // Word 3: swapper (address, left-padded)
    data[96 + 12..128].copy_from_slice(swapper.as_slice());

    // Word 4: to (address, left-padded)
    data[128 + 12..160].copy_from_slice(to.as_slice());

    // Word 5: keccak256(uri)
    data[160..192].copy_from_slice(&keccak256(uri.as_bytes()));

    B256::from(keccak256(&data))
}
