//! Events recorded by successful operations

use crate::state::{Address, VaultId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    VaultCreated {
        id: VaultId,
        owner: Address,
    },
    VaultDestroyed {
        id: VaultId,
    },
    VaultTransferred {
        id: VaultId,
        from: Address,
        to: Address,
    },
    CollateralDeposited {
        id: VaultId,
        amount: u128,
    },
    CollateralWithdrawn {
        id: VaultId,
        amount: u128,
    },
    TokenBorrowed {
        id: VaultId,
        amount: u128,
    },
    TokenRepaid {
        id: VaultId,
        amount: u128,
        /// Closing fee moved to the treasury vault, in collateral
        fee: u128,
    },
    VaultLiquidated {
        id: VaultId,
        liquidator: Address,
        /// Debt repaid by the liquidator
        cost: u128,
        /// Collateral credited to the liquidator's reward balance
        extract: u128,
    },
    RewardClaimed {
        who: Address,
        amount: u128,
    },
    ParameterChanged {
        name: &'static str,
    },
}

impl Event {
    /// Vault the event refers to, if any
    pub fn vault_id(&self) -> Option<VaultId> {
        match self {
            Event::VaultCreated { id, .. }
            | Event::VaultDestroyed { id }
            | Event::VaultTransferred { id, .. }
            | Event::CollateralDeposited { id, .. }
            | Event::CollateralWithdrawn { id, .. }
            | Event::TokenBorrowed { id, .. }
            | Event::TokenRepaid { id, .. }
            | Event::VaultLiquidated { id, .. } => Some(*id),
            Event::RewardClaimed { .. } | Event::ParameterChanged { .. } => None,
        }
    }
}
