//! Ledger state: vault records, the borrowed total and rollback checkpoints

use crate::error::{EngineError, EngineResult};
use crate::math::{add_u128, sub_u128};
use crate::rewards::RewardLedger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Vault identifier, allocated sequentially from 0 and never reused
pub type VaultId = u64;

/// Opaque 32-byte principal (user, engine, liquidator, stability pool)
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Deterministic address derived from a human label (truncated to 32 bytes)
    pub fn from_label(label: &str) -> Self {
        let mut bytes = [0u8; 32];
        for (dst, src) in bytes.iter_mut().zip(label.as_bytes()) {
            *dst = *src;
        }
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Collateral and debt held by one vault
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Collateral in base units of the collateral asset
    pub collateral: u128,
    /// Outstanding debt in base units of the debt token
    pub debt: u128,
}

impl Vault {
    pub fn is_empty(&self) -> bool {
        self.collateral == 0 && self.debt == 0
    }
}

/// Mutable engine ledger
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineState {
    vaults: BTreeMap<VaultId, Vault>,
    next_id: VaultId,
    total_borrowed: u128,
    pub rewards: RewardLedger,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next vault id and insert an empty record
    pub fn open_vault(&mut self) -> VaultId {
        let id = self.next_id;
        self.next_id += 1;
        self.vaults.insert(id, Vault::default());
        id
    }

    pub fn close_vault(&mut self, id: VaultId) -> EngineResult<Vault> {
        self.vaults.remove(&id).ok_or(EngineError::VaultNotFound(id))
    }

    pub fn vault(&self, id: VaultId) -> EngineResult<&Vault> {
        self.vaults.get(&id).ok_or(EngineError::VaultNotFound(id))
    }

    pub fn vault_mut(&mut self, id: VaultId) -> EngineResult<&mut Vault> {
        self.vaults.get_mut(&id).ok_or(EngineError::VaultNotFound(id))
    }

    pub fn contains(&self, id: VaultId) -> bool {
        self.vaults.contains_key(&id)
    }

    /// Live vaults in id order
    pub fn iter(&self) -> impl Iterator<Item = (VaultId, &Vault)> {
        self.vaults.iter().map(|(id, v)| (*id, v))
    }

    pub fn live_count(&self) -> usize {
        self.vaults.len()
    }

    /// Number of ids ever allocated
    pub fn next_id(&self) -> VaultId {
        self.next_id
    }

    pub fn total_borrowed(&self) -> u128 {
        self.total_borrowed
    }

    /// Increase a vault's debt and the borrowed total together
    pub fn add_debt(&mut self, id: VaultId, amount: u128) -> EngineResult<()> {
        let total = add_u128(self.total_borrowed, amount)?;
        let vault = self.vault_mut(id)?;
        vault.debt = add_u128(vault.debt, amount)?;
        self.total_borrowed = total;
        Ok(())
    }

    /// Decrease a vault's debt and the borrowed total together
    pub fn sub_debt(&mut self, id: VaultId, amount: u128) -> EngineResult<()> {
        let total = sub_u128(self.total_borrowed, amount)?;
        let vault = self.vault_mut(id)?;
        vault.debt = sub_u128(vault.debt, amount)?;
        self.total_borrowed = total;
        Ok(())
    }

    /// Record the touched entries so the operation can be undone
    pub fn checkpoint(&self, vaults: &[VaultId], rewards: &[Address]) -> Checkpoint {
        Checkpoint {
            vaults: vaults
                .iter()
                .map(|id| (*id, self.vaults.get(id).copied()))
                .collect(),
            rewards: rewards
                .iter()
                .map(|who| (*who, self.rewards.claimable(who)))
                .collect(),
            total_borrowed: self.total_borrowed,
            next_id: self.next_id,
        }
    }

    /// Put every entry recorded in `cp` back to its recorded value
    pub fn restore(&mut self, cp: Checkpoint) {
        for (id, saved) in cp.vaults {
            match saved {
                Some(v) => {
                    self.vaults.insert(id, v);
                }
                None => {
                    self.vaults.remove(&id);
                }
            }
        }
        for (who, amount) in cp.rewards {
            self.rewards.set(who, amount);
        }
        self.total_borrowed = cp.total_borrowed;
        self.next_id = cp.next_id;
    }
}

/// Saved values of every ledger entry one operation may touch
#[derive(Debug)]
pub struct Checkpoint {
    vaults: Vec<(VaultId, Option<Vault>)>,
    rewards: Vec<(Address, u128)>,
    total_borrowed: u128,
    next_id: VaultId,
}
