//! In-process ledger harness.
//!
//! Owns one chain's registry and bridge behind a single lock, executes
//! transactions atomically in submission order, assigns deterministic
//! transaction hashes, and appends emitted events to the chain's
//! append-only log. This is the stand-in for the external submit/subscribe
//! machinery a production deployment would get from a real node.

use std::sync::Mutex;

use alloy::primitives::{Address, B256, PrimitiveSignature as Signature};
use async_trait::async_trait;
use tracing::debug;

use a721_core::event::{ChainEvent, LoggedEvent};
use a721_core::hash::keccak256;
use a721_core::signer::SignerSet;
use a721_core::types::{ChainId, ItemId};

use crate::bridge::Bridge;
use crate::client::{ChainClient, SubmitError};
use crate::error::ContractError;
use crate::registry::{AssetRegistry, Role};

/// A state-mutating call, dispatched to the registry or the bridge.
#[derive(Debug, Clone)]
pub enum Call {
    // Asset registry
    Mint { owner: Address, uri: String },
    Burn { item_id: ItemId },
    Transfer { from: Address, to: Address, item_id: ItemId },
    Approve { spender: Address, item_id: ItemId },
    SetApprovalForAll { operator: Address, approved: bool },
    GrantRole { role: Role, account: Address },
    RevokeRole { role: Role, account: Address },
    // Bridge
    AddChain { chain_id: ChainId },
    RemoveChain { chain_id: ChainId },
    Pause,
    Unpause,
    Swap { item_id: ItemId, to: Address, chain_to: ChainId },
    Redeem {
        message_hash: B256,
        signatures: Vec<Signature>,
        item_id: ItemId,
        uri: String,
        to: Address,
        chain_from: ChainId,
    },
}

/// A submitted transaction: the sending account plus the call it makes.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub sender: Address,
    pub call: Call,
}

/// Result of an included transaction.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub tx_hash: B256,
    /// The events this transaction appended to the chain's log.
    pub events: Vec<LoggedEvent>,
}

/// Construction parameters for a chain.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub chain_id: ChainId,
    pub admin: Address,
    /// Account allowed to call `redeem` on this chain's bridge.
    pub gateway_caller: Address,
    pub signers: SignerSet,
}

struct LedgerState {
    registry: AssetRegistry,
    bridge: Bridge,
    log: Vec<LoggedEvent>,
    tx_count: u64,
}

/// One chain. All state transitions are serialized behind the inner lock,
/// held for the duration of a single call; chains share nothing with each
/// other but signed messages.
pub struct Ledger {
    chain_id: ChainId,
    bridge_account: Address,
    inner: Mutex<LedgerState>,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        let bridge_account = derive_bridge_account(config.chain_id);
        let mut registry = AssetRegistry::new(config.chain_id, config.admin);
        // The local bridge instance mints, burns, and moves items on its
        // own authority.
        for role in [Role::Minter, Role::Burner, Role::Bridge] {
            registry
                .grant_role(config.admin, role, bridge_account)
                .expect("admin holds the admin role at construction");
        }
        let bridge = Bridge::new(
            config.chain_id,
            bridge_account,
            config.admin,
            config.gateway_caller,
            config.signers,
        );
        Self {
            chain_id: config.chain_id,
            bridge_account,
            inner: Mutex::new(LedgerState {
                registry,
                bridge,
                log: Vec::new(),
                tx_count: 0,
            }),
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// The bridge instance's own account on this chain.
    pub fn bridge_account(&self) -> Address {
        self.bridge_account
    }

    /// Execute a transaction. Atomic with respect to every other call on
    /// this chain; a rejected transaction appends nothing to the log.
    pub fn execute(&self, tx: Transaction) -> Result<TxOutcome, ContractError> {
        let mut state = self.inner.lock().expect("ledger lock poisoned");
        let tx_index = state.tx_count;
        state.tx_count += 1;
        let tx_hash = tx_hash_for(self.chain_id, tx_index);

        let events = dispatch(&mut state, &tx)?;

        let mut logged = Vec::with_capacity(events.len());
        for event in events {
            let seq = state.log.len() as u64;
            let entry = LoggedEvent { seq, tx_hash, event };
            state.log.push(entry.clone());
            logged.push(entry);
        }

        Ok(TxOutcome { tx_hash, events: logged })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn owner_of(&self, item_id: ItemId) -> Result<Address, ContractError> {
        self.inner.lock().expect("ledger lock poisoned").registry.owner_of(item_id)
    }

    pub fn token_uri(&self, item_id: ItemId) -> Result<String, ContractError> {
        let state = self.inner.lock().expect("ledger lock poisoned");
        state.registry.token_uri(item_id).map(str::to_string)
    }

    pub fn exists(&self, item_id: ItemId) -> bool {
        self.inner.lock().expect("ledger lock poisoned").registry.exists(item_id)
    }

    pub fn is_redeemed(&self, message_hash: &B256) -> bool {
        self.inner.lock().expect("ledger lock poisoned").bridge.is_redeemed(message_hash)
    }

    pub fn is_supported(&self, chain_id: ChainId) -> bool {
        self.inner.lock().expect("ledger lock poisoned").bridge.is_supported(chain_id)
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().expect("ledger lock poisoned").bridge.is_paused()
    }

    /// Read the event log from `cursor` onward.
    pub fn events_from(&self, cursor: u64) -> Vec<LoggedEvent> {
        let state = self.inner.lock().expect("ledger lock poisoned");
        match usize::try_from(cursor) {
            Ok(start) if start < state.log.len() => state.log[start..].to_vec(),
            _ => Vec::new(),
        }
    }

    /// Current log length; the cursor value from which `events_from`
    /// returns nothing yet.
    pub fn log_len(&self) -> u64 {
        self.inner.lock().expect("ledger lock poisoned").log.len() as u64
    }
}

fn dispatch(state: &mut LedgerState, tx: &Transaction) -> Result<Vec<ChainEvent>, ContractError> {
    let sender = tx.sender;
    match &tx.call {
        Call::Mint { owner, uri } => {
            let (item_id, event) = state.registry.mint(sender, *owner, uri.clone())?;
            debug!(item_id = %item_id, owner = %owner, "item minted");
            Ok(vec![event])
        }
        Call::Burn { item_id } => Ok(vec![state.registry.burn(sender, *item_id)?]),
        Call::Transfer { from, to, item_id } => {
            Ok(vec![state.registry.transfer(sender, *from, *to, *item_id)?])
        }
        Call::Approve { spender, item_id } => {
            Ok(vec![state.registry.approve(sender, *spender, *item_id)?])
        }
        Call::SetApprovalForAll { operator, approved } => {
            Ok(vec![state.registry.set_approval_for_all(sender, *operator, *approved)?])
        }
        Call::GrantRole { role, account } => {
            state.registry.grant_role(sender, *role, *account)?;
            Ok(Vec::new())
        }
        Call::RevokeRole { role, account } => {
            state.registry.revoke_role(sender, *role, *account)?;
            Ok(Vec::new())
        }
        Call::AddChain { chain_id } => {
            Ok(state.bridge.add_chain(sender, *chain_id)?.into_iter().collect())
        }
        Call::RemoveChain { chain_id } => {
            Ok(state.bridge.remove_chain(sender, *chain_id)?.into_iter().collect())
        }
        Call::Pause => {
            state.bridge.pause(sender)?;
            Ok(Vec::new())
        }
        Call::Unpause => {
            state.bridge.unpause(sender)?;
            Ok(Vec::new())
        }
        Call::Swap { item_id, to, chain_to } => {
            let (message_hash, events) =
                state
                    .bridge
                    .swap(&mut state.registry, sender, *item_id, *to, *chain_to)?;
            debug!(
                item_id = %item_id,
                chain_to = %chain_to,
                message_hash = %message_hash,
                "swap initialized"
            );
            Ok(events)
        }
        Call::Redeem {
            message_hash,
            signatures,
            item_id,
            uri,
            to,
            chain_from,
        } => {
            let events = state.bridge.redeem(
                &mut state.registry,
                sender,
                *message_hash,
                signatures,
                *item_id,
                uri.clone(),
                *to,
                *chain_from,
            )?;
            debug!(item_id = %item_id, message_hash = %message_hash, "swap redeemed");
            Ok(events)
        }
    }
}

/// Deterministic per-chain transaction hash:
/// keccak256(chainId || txIndex), both big-endian.
fn tx_hash_for(chain_id: ChainId, tx_index: u64) -> B256 {
    let mut data = [0u8; 16];
    data[..8].copy_from_slice(&chain_id.as_u64().to_be_bytes());
    data[8..].copy_from_slice(&tx_index.to_be_bytes());
    B256::from(keccak256(&data))
}

/// The bridge instance's account address, derived from the chain id the
/// way a deployment address would be fixed at genesis.
fn derive_bridge_account(chain_id: ChainId) -> Address {
    let digest = keccak256(format!("a721-bridge/{}", chain_id.as_u64()).as_bytes());
    Address::from_slice(&digest[12..])
}

#[async_trait]
impl ChainClient for Ledger {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    async fn events_since(&self, cursor: u64) -> Result<Vec<LoggedEvent>, SubmitError> {
        Ok(self.events_from(cursor))
    }

    async fn submit(&self, tx: Transaction) -> Result<TxOutcome, SubmitError> {
        self.execute(tx).map_err(SubmitError::Rejected)
    }
}
