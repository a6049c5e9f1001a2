//! External collaborators: fungible assets and the vault ownership registry

use crate::error::{OwnershipError, TransferError};
use crate::state::{Address, VaultId};

/// Fungible asset with balance/allowance semantics (collateral or debt token)
pub trait Asset {
    /// Move `amount` from `from` to `to` using an allowance granted to `spender`
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Move `amount` held by `from` to `to`
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError>;

    fn balance_of(&self, who: &Address) -> u128;
}

/// Non-fungible ownership record for vault ids
pub trait VaultOwnership {
    fn mint(&mut self, to: &Address, id: VaultId) -> Result<(), OwnershipError>;

    fn burn(&mut self, id: VaultId) -> Result<(), OwnershipError>;

    fn owner_of(&self, id: VaultId) -> Option<Address>;

    /// Number of vaults held by `who`
    fn balance_of(&self, who: &Address) -> u64;

    fn transfer(&mut self, from: &Address, to: &Address, id: VaultId) -> Result<(), OwnershipError>;
}
