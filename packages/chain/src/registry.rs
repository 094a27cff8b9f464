//! Asset registry: an ownership ledger with capability-gated mutation.
//!
//! Ids are assigned from this chain's range (`chain_id * RANGE_UNIT + seq`)
//! on a normal mint; a bridge mint re-creates a foreign item under its
//! original id verbatim. Minting and burning require capability roles held
//! by the chain administrator and the local bridge instance.

use std::collections::{HashMap, HashSet};
use std::fmt;

use alloy::primitives::Address;

use a721_core::event::ChainEvent;
use a721_core::types::{ChainId, ItemId, RANGE_UNIT};

use crate::error::ContractError;

/// Capability roles gating registry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// May grant and revoke roles.
    Admin,
    /// May mint (normal and bridge mint).
    Minter,
    /// May burn.
    Burner,
    /// May transfer any item; held by the local bridge instance so that
    /// lock and unlock need no per-user approval round-trip.
    Bridge,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Minter => "MINTER",
            Role::Burner => "BURNER",
            Role::Bridge => "BRIDGE",
        };
        write!(f, "{name}")
    }
}

/// Per-chain asset registry.
pub struct AssetRegistry {
    chain_id: ChainId,
    /// Next sequence number for locally-minted ids. Monotonic, never reused.
    next_sequence: u64,
    owners: HashMap<ItemId, Address>,
    uris: HashMap<ItemId, String>,
    /// Per-item approved spender, cleared on every transfer and burn.
    approvals: HashMap<ItemId, Address>,
    /// owner -> operators approved for all of the owner's items.
    operators: HashMap<Address, HashSet<Address>>,
    roles: HashMap<Role, HashSet<Address>>,
}

impl AssetRegistry {
    /// Create a registry whose `admin` holds the Admin, Minter, and Burner
    /// roles. The Bridge role is granted separately once the bridge
    /// instance's account is known.
    pub fn new(chain_id: ChainId, admin: Address) -> Self {
        let mut roles: HashMap<Role, HashSet<Address>> = HashMap::new();
        roles.insert(Role::Admin, HashSet::from([admin]));
        roles.insert(Role::Minter, HashSet::from([admin]));
        roles.insert(Role::Burner, HashSet::from([admin]));
        Self {
            chain_id,
            next_sequence: 0,
            owners: HashMap::new(),
            uris: HashMap::new(),
            approvals: HashMap::new(),
            operators: HashMap::new(),
            roles,
        }
    }

    // ========================================================================
    // Roles
    // ========================================================================

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.get(&role).is_some_and(|members| members.contains(account))
    }

    pub fn grant_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError> {
        if !self.has_role(Role::Admin, &caller) {
            return Err(ContractError::Unauthorized);
        }
        self.roles.entry(role).or_default().insert(account);
        Ok(())
    }

    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError> {
        if !self.has_role(Role::Admin, &caller) {
            return Err(ContractError::Unauthorized);
        }
        if let Some(members) = self.roles.get_mut(&role) {
            members.remove(&account);
        }
        Ok(())
    }

    fn require_role(&self, role: Role, account: &Address) -> Result<(), ContractError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(ContractError::MissingRole { role })
        }
    }

    // ========================================================================
    // Minting and burning
    // ========================================================================

    /// Mint a new item with the next id from this chain's range.
    pub fn mint(
        &mut self,
        caller: Address,
        owner: Address,
        uri: String,
    ) -> Result<(ItemId, ChainEvent), ContractError> {
        self.require_role(Role::Minter, &caller)?;
        if owner == Address::ZERO {
            return Err(ContractError::InvalidRecipient);
        }
        if self.next_sequence >= RANGE_UNIT {
            // Overflowing here would mint into the neighboring chain's range.
            return Err(ContractError::IdSpaceExhausted);
        }

        let item_id = ItemId::from_parts(self.chain_id, self.next_sequence);
        self.next_sequence += 1;
        self.owners.insert(item_id, owner);
        self.uris.insert(item_id, uri);

        Ok((
            item_id,
            ChainEvent::Transfer {
                from: Address::ZERO,
                to: owner,
                item_id,
            },
        ))
    }

    /// Re-create an item that originated elsewhere, under its original id
    /// and uri. Used only by the bridge's redemption path.
    pub fn bridge_mint(
        &mut self,
        caller: Address,
        item_id: ItemId,
        owner: Address,
        uri: String,
    ) -> Result<ChainEvent, ContractError> {
        self.require_role(Role::Minter, &caller)?;
        if owner == Address::ZERO {
            return Err(ContractError::InvalidRecipient);
        }
        if self.owners.contains_key(&item_id) {
            return Err(ContractError::AlreadyExists { item_id });
        }

        self.owners.insert(item_id, owner);
        self.uris.insert(item_id, uri);

        Ok(ChainEvent::Transfer {
            from: Address::ZERO,
            to: owner,
            item_id,
        })
    }

    pub fn burn(&mut self, caller: Address, item_id: ItemId) -> Result<ChainEvent, ContractError> {
        self.require_role(Role::Burner, &caller)?;
        let owner = self
            .owners
            .remove(&item_id)
            .ok_or(ContractError::NotFound { item_id })?;
        self.uris.remove(&item_id);
        self.approvals.remove(&item_id);

        Ok(ChainEvent::Transfer {
            from: owner,
            to: Address::ZERO,
            item_id,
        })
    }

    // ========================================================================
    // Transfers and approvals
    // ========================================================================

    /// Transfer `item_id` from `from` to `to`. The caller must be the owner,
    /// the approved spender for the item, an operator for all of `from`'s
    /// items, or hold the Bridge role.
    pub fn transfer(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        item_id: ItemId,
    ) -> Result<ChainEvent, ContractError> {
        let owner = *self
            .owners
            .get(&item_id)
            .ok_or(ContractError::NotFound { item_id })?;
        if from != owner {
            return Err(ContractError::NotOwner);
        }
        if to == Address::ZERO {
            return Err(ContractError::InvalidRecipient);
        }

        let authorized = caller == owner
            || self.approvals.get(&item_id) == Some(&caller)
            || self.is_approved_for_all(&owner, &caller)
            || self.has_role(Role::Bridge, &caller);
        if !authorized {
            return Err(ContractError::NotAuthorized);
        }

        self.owners.insert(item_id, to);
        self.approvals.remove(&item_id);

        Ok(ChainEvent::Transfer { from, to, item_id })
    }

    /// Approve `spender` to transfer `item_id`. Caller must be the owner or
    /// an operator for all of the owner's items.
    pub fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        item_id: ItemId,
    ) -> Result<ChainEvent, ContractError> {
        let owner = *self
            .owners
            .get(&item_id)
            .ok_or(ContractError::NotFound { item_id })?;
        if caller != owner && !self.is_approved_for_all(&owner, &caller) {
            return Err(ContractError::NotAuthorized);
        }

        self.approvals.insert(item_id, spender);

        Ok(ChainEvent::Approval {
            owner,
            spender,
            item_id,
        })
    }

    pub fn set_approval_for_all(
        &mut self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<ChainEvent, ContractError> {
        if operator == Address::ZERO {
            return Err(ContractError::InvalidRecipient);
        }
        let entry = self.operators.entry(caller).or_default();
        if approved {
            entry.insert(operator);
        } else {
            entry.remove(&operator);
        }

        Ok(ChainEvent::ApprovalForAll {
            owner: caller,
            operator,
            approved,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn owner_of(&self, item_id: ItemId) -> Result<Address, ContractError> {
        self.owners
            .get(&item_id)
            .copied()
            .ok_or(ContractError::NotFound { item_id })
    }

    pub fn exists(&self, item_id: ItemId) -> bool {
        self.owners.contains_key(&item_id)
    }

    pub fn token_uri(&self, item_id: ItemId) -> Result<&str, ContractError> {
        self.uris
            .get(&item_id)
            .map(String::as_str)
            .ok_or(ContractError::NotFound { item_id })
    }

    pub fn approved_for(&self, item_id: ItemId) -> Result<Option<Address>, ContractError> {
        if !self.exists(item_id) {
            return Err(ContractError::NotFound { item_id });
        }
        Ok(self.approvals.get(&item_id).copied())
    }

    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.operators
            .get(owner)
            .is_some_and(|ops| ops.contains(operator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "https://gateway.pinata.cloud/ipfs/uri/1.json";

    fn admin() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn alice() -> Address {
        Address::repeat_byte(0x01)
    }

    fn bob() -> Address {
        Address::repeat_byte(0x02)
    }

    fn registry() -> AssetRegistry {
        AssetRegistry::new(ChainId(1), admin())
    }

    #[test]
    fn test_mint_assigns_ids_from_chain_range() {
        let mut reg = registry();
        let (id1, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        let (id2, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        assert_eq!(id1.as_u64(), 10_000);
        assert_eq!(id2.as_u64(), 10_001);
        assert_eq!(reg.owner_of(id1).unwrap(), alice());
        assert_eq!(reg.token_uri(id1).unwrap(), URI);
    }

    #[test]
    fn test_mint_requires_minter_role() {
        let mut reg = registry();
        assert_eq!(
            reg.mint(alice(), alice(), URI.into()),
            Err(ContractError::MissingRole { role: Role::Minter })
        );
    }

    #[test]
    fn test_mint_to_zero_address_fails() {
        let mut reg = registry();
        assert_eq!(
            reg.mint(admin(), Address::ZERO, URI.into()),
            Err(ContractError::InvalidRecipient)
        );
    }

    #[test]
    fn test_mint_rejects_exhausted_id_range() {
        let mut reg = registry();
        reg.next_sequence = RANGE_UNIT - 1;
        let (id, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        assert_eq!(id.as_u64(), 19_999);
        assert_eq!(
            reg.mint(admin(), alice(), URI.into()),
            Err(ContractError::IdSpaceExhausted)
        );
    }

    #[test]
    fn test_bridge_mint_preserves_foreign_id() {
        let mut reg = registry();
        let foreign = ItemId(20_000);
        let event = reg.bridge_mint(admin(), foreign, bob(), URI.into()).unwrap();
        assert_eq!(
            event,
            ChainEvent::Transfer { from: Address::ZERO, to: bob(), item_id: foreign }
        );
        assert_eq!(
            reg.bridge_mint(admin(), foreign, bob(), URI.into()),
            Err(ContractError::AlreadyExists { item_id: foreign })
        );
    }

    #[test]
    fn test_burn_clears_item() {
        let mut reg = registry();
        let (id, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        let event = reg.burn(admin(), id).unwrap();
        assert_eq!(
            event,
            ChainEvent::Transfer { from: alice(), to: Address::ZERO, item_id: id }
        );
        assert!(!reg.exists(id));
        assert_eq!(reg.owner_of(id), Err(ContractError::NotFound { item_id: id }));
    }

    #[test]
    fn test_transfer_by_owner() {
        let mut reg = registry();
        let (id, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        reg.transfer(alice(), alice(), bob(), id).unwrap();
        assert_eq!(reg.owner_of(id).unwrap(), bob());
    }

    #[test]
    fn test_transfer_by_stranger_fails() {
        let mut reg = registry();
        let (id, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        assert_eq!(
            reg.transfer(bob(), alice(), bob(), id),
            Err(ContractError::NotAuthorized)
        );
    }

    #[test]
    fn test_transfer_wrong_from_fails() {
        let mut reg = registry();
        let (id, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        assert_eq!(reg.transfer(bob(), bob(), alice(), id), Err(ContractError::NotOwner));
    }

    #[test]
    fn test_approved_spender_can_transfer_once() {
        let mut reg = registry();
        let (id, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        reg.approve(alice(), bob(), id).unwrap();
        assert_eq!(reg.approved_for(id).unwrap(), Some(bob()));

        reg.transfer(bob(), alice(), bob(), id).unwrap();
        // Approval is consumed by the transfer
        assert_eq!(reg.approved_for(id).unwrap(), None);
    }

    #[test]
    fn test_operator_approval_covers_all_items() {
        let mut reg = registry();
        let (id1, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        let (id2, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        reg.set_approval_for_all(alice(), bob(), true).unwrap();
        assert!(reg.is_approved_for_all(&alice(), &bob()));
        assert!(!reg.is_approved_for_all(&bob(), &alice()));

        reg.transfer(bob(), alice(), bob(), id1).unwrap();
        reg.transfer(bob(), alice(), bob(), id2).unwrap();

        reg.set_approval_for_all(alice(), bob(), false).unwrap();
        assert!(!reg.is_approved_for_all(&alice(), &bob()));
    }

    #[test]
    fn test_approve_requires_owner() {
        let mut reg = registry();
        let (id, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        assert_eq!(reg.approve(bob(), bob(), id), Err(ContractError::NotAuthorized));
    }

    #[test]
    fn test_bridge_role_may_transfer_without_approval() {
        let mut reg = registry();
        let bridge = Address::repeat_byte(0xbb);
        reg.grant_role(admin(), Role::Bridge, bridge).unwrap();
        let (id, _) = reg.mint(admin(), alice(), URI.into()).unwrap();
        reg.transfer(bridge, alice(), bridge, id).unwrap();
        assert_eq!(reg.owner_of(id).unwrap(), bridge);
    }

    #[test]
    fn test_role_grant_requires_admin() {
        let mut reg = registry();
        assert_eq!(
            reg.grant_role(alice(), Role::Minter, alice()),
            Err(ContractError::Unauthorized)
        );
        reg.grant_role(admin(), Role::Minter, alice()).unwrap();
        assert!(reg.has_role(Role::Minter, &alice()));
        reg.revoke_role(admin(), Role::Minter, alice()).unwrap();
        assert!(!reg.has_role(Role::Minter, &alice()));
    }

    #[test]
    fn test_queries_on_missing_item() {
        let reg = registry();
        let missing = ItemId(10_042);
        assert!(!reg.exists(missing));
        assert_eq!(reg.owner_of(missing), Err(ContractError::NotFound { item_id: missing }));
        assert_eq!(reg.token_uri(missing), Err(ContractError::NotFound { item_id: missing }));
        assert_eq!(reg.approved_for(missing), Err(ContractError::NotFound { item_id: missing }));
    }
}
