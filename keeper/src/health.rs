//! Health calculation for vaults

use vault_engine::{Asset, EngineResult, VaultEngine, VaultId, VaultOwnership, Address};

/// Vault health snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultHealth {
    pub id: VaultId,
    pub owner: Option<Address>,
    /// Collateralization percentage
    pub ratio: u128,
    /// ratio - minimum, in percentage points
    pub health: i128,
    pub collateral: u128,
    pub debt: u128,
}

impl VaultHealth {
    /// Check if vault needs liquidation
    pub fn needs_liquidation(&self) -> bool {
        self.health < 0
    }

    /// Check if vault is safe but within `buffer` points of the minimum
    pub fn at_risk(&self, buffer: i128) -> bool {
        self.health >= 0 && self.health < buffer
    }
}

/// Calculate health: ratio - minimum ratio
///
/// Returns health value where:
/// - health < 0: below the minimum (liquidatable)
/// - 0 <= health < buffer: at risk
/// - health >= buffer: healthy
pub fn calculate_health(ratio: u128, min_percentage: u128) -> i128 {
    let ratio = i128::try_from(ratio).unwrap_or(i128::MAX);
    let min = i128::try_from(min_percentage).unwrap_or(i128::MAX);
    ratio.saturating_sub(min)
}

/// Health of one vault at current engine prices
pub fn vault_health<C, D, N>(engine: &VaultEngine<C, D, N>, id: VaultId) -> EngineResult<VaultHealth>
where
    C: Asset,
    D: Asset,
    N: VaultOwnership,
{
    let vault = engine.vault(id)?;
    let ratio = engine.collateralization_percentage(id)?;
    Ok(VaultHealth {
        id,
        owner: engine.owner_of(id),
        ratio,
        health: calculate_health(ratio, engine.params().min_collateral_percentage),
        collateral: vault.collateral,
        debt: vault.debt,
    })
}

/// Health of every vault that carries debt
pub fn scan<C, D, N>(engine: &VaultEngine<C, D, N>) -> EngineResult<Vec<VaultHealth>>
where
    C: Asset,
    D: Asset,
    N: VaultOwnership,
{
    let mut out = Vec::new();
    for id in engine.vault_ids() {
        if engine.vault_debt(id)? == 0 {
            continue;
        }
        out.push(vault_health(engine, id)?);
    }
    Ok(out)
}
