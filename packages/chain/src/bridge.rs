//! Bridge state machine.
//!
//! One instance per chain. Enforces the transfer protocol: chain
//! allow-listing, pause/unpause, swap initiation (lock on the home chain,
//! burn elsewhere), and signature-gated redemption (unlock at home, mint
//! elsewhere) with at-most-once settlement per message hash.

use std::collections::HashSet;

use alloy::primitives::{Address, B256, PrimitiveSignature as Signature};

use a721_core::event::ChainEvent;
use a721_core::hash::compute_message_hash;
use a721_core::signer::{SignerSet, VerifyError};
use a721_core::types::{ChainId, ItemId};

use crate::error::ContractError;
use crate::registry::AssetRegistry;

pub struct Bridge {
    chain_id: ChainId,
    /// The bridge's own ledger account; custodian of locked items.
    account: Address,
    admin: Address,
    /// The only account allowed to call `redeem`, independent of whose
    /// signatures the attestation carries.
    gateway_caller: Address,
    signers: SignerSet,
    paused: bool,
    supported: HashSet<ChainId>,
    /// Settled message hashes. Append-only for the lifetime of the
    /// deployment; the sole replay-protection gate.
    redeemed: HashSet<B256>,
}

impl Bridge {
    pub fn new(
        chain_id: ChainId,
        account: Address,
        admin: Address,
        gateway_caller: Address,
        signers: SignerSet,
    ) -> Self {
        Self {
            chain_id,
            account,
            admin,
            gateway_caller,
            signers,
            paused: false,
            supported: HashSet::new(),
            redeemed: HashSet::new(),
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_supported(&self, chain_id: ChainId) -> bool {
        self.supported.contains(&chain_id)
    }

    pub fn is_redeemed(&self, message_hash: &B256) -> bool {
        self.redeemed.contains(message_hash)
    }

    fn require_admin(&self, caller: Address) -> Result<(), ContractError> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(ContractError::Unauthorized)
        }
    }

    // ========================================================================
    // Administration (callable regardless of pause state)
    // ========================================================================

    /// Allow-list a destination chain. Idempotent: re-adding emits nothing.
    pub fn add_chain(
        &mut self,
        caller: Address,
        chain_id: ChainId,
    ) -> Result<Option<ChainEvent>, ContractError> {
        self.require_admin(caller)?;
        if self.supported.insert(chain_id) {
            Ok(Some(ChainEvent::ChainAdded { chain_id, admin: caller }))
        } else {
            Ok(None)
        }
    }

    pub fn remove_chain(
        &mut self,
        caller: Address,
        chain_id: ChainId,
    ) -> Result<Option<ChainEvent>, ContractError> {
        self.require_admin(caller)?;
        if self.supported.remove(&chain_id) {
            Ok(Some(ChainEvent::ChainRemoved { chain_id, admin: caller }))
        } else {
            Ok(None)
        }
    }

    pub fn pause(&mut self, caller: Address) -> Result<(), ContractError> {
        self.require_admin(caller)?;
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> Result<(), ContractError> {
        self.require_admin(caller)?;
        self.paused = false;
        Ok(())
    }

    // ========================================================================
    // Swap
    // ========================================================================

    /// Initiate a cross-chain transfer of `item_id` to account `to` on
    /// `chain_to`.
    ///
    /// On the item's home chain the asset is locked (transferred to the
    /// bridge account, recoverable); on any other chain the local
    /// representation is burned. Returns the message hash the destination
    /// will verify, plus the emitted events.
    pub fn swap(
        &mut self,
        registry: &mut AssetRegistry,
        caller: Address,
        item_id: ItemId,
        to: Address,
        chain_to: ChainId,
    ) -> Result<(B256, Vec<ChainEvent>), ContractError> {
        if !self.supported.contains(&chain_to) {
            return Err(ContractError::UnsupportedChain { chain_id: chain_to });
        }
        let owner = registry.owner_of(item_id)?;
        if owner != caller {
            return Err(ContractError::NotOwner);
        }
        if self.paused {
            return Err(ContractError::Paused);
        }

        // Read the uri before a burn destroys it; the destination re-creates
        // the item with exactly this metadata.
        let uri = registry.token_uri(item_id)?.to_string();

        let asset_event = if item_id.home_chain() == self.chain_id {
            // Lock: the bridge takes custody, the item stays recoverable.
            registry.transfer(self.account, caller, self.account, item_id)?
        } else {
            // The item arrived here via a previous redemption and is about
            // to leave again.
            registry.burn(self.account, item_id)?
        };

        let message_hash =
            compute_message_hash(item_id, chain_to, self.chain_id, &caller, &to, &uri);

        let events = vec![
            asset_event,
            ChainEvent::SwapInitialized {
                item_id,
                chain_to,
                chain_from: self.chain_id,
                swapper: caller,
                to,
                uri,
            },
        ];

        Ok((message_hash, events))
    }

    // ========================================================================
    // Redeem
    // ========================================================================

    /// Settle a swap observed on `chain_from`.
    ///
    /// The message hash is marked consumed before any registry effect, so a
    /// settlement that then fails on a protocol violation stays closed
    /// rather than retryable.
    #[allow(clippy::too_many_arguments)]
    pub fn redeem(
        &mut self,
        registry: &mut AssetRegistry,
        caller: Address,
        message_hash: B256,
        signatures: &[Signature],
        item_id: ItemId,
        uri: String,
        to: Address,
        chain_from: ChainId,
    ) -> Result<Vec<ChainEvent>, ContractError> {
        if caller != self.gateway_caller {
            return Err(ContractError::OnlyGateway);
        }

        self.signers
            .verify(&message_hash, signatures)
            .map_err(|e| match e {
                VerifyError::InvalidSignature => ContractError::InvalidSignature,
                VerifyError::InsufficientSignatures { got, required } => {
                    ContractError::InsufficientSignatures { got, required }
                }
            })?;

        if self.redeemed.contains(&message_hash) {
            return Err(ContractError::AlreadyRedeemed);
        }
        self.redeemed.insert(message_hash);

        let asset_event = if item_id.home_chain() == self.chain_id {
            // The asset is returning home: it must be sitting in the bridge
            // account from the swap that sent it away.
            let holder = registry
                .owner_of(item_id)
                .map_err(|_| ContractError::ProtocolViolation {
                    reason: format!("unlock of unknown item {item_id}"),
                })?;
            if holder != self.account {
                return Err(ContractError::ProtocolViolation {
                    reason: format!("item {item_id} is not held by the bridge"),
                });
            }
            registry.transfer(self.account, self.account, to, item_id)?
        } else {
            registry.bridge_mint(self.account, item_id, to, uri)?
        };

        let events = vec![
            asset_event,
            ChainEvent::SwapRedeemed {
                message_hash,
                item_id,
                chain_from,
                to,
            },
        ];

        Ok(events)
    }
}
