//! Liquidation engine
//!
//! A vault whose collateralization percentage `r` is below the minimum `m`
//! can be partially closed by a third party. With collateral value `CV`,
//! debt value `DV` and gain multiplier `g = G / 10_000`, repaying value `x`
//! and receiving `g·x` of collateral leaves the vault at
//!
//! ```text
//!   100·(CV − g·x) / (DV − x)
//! ```
//!
//! which is at least `m` once `x ≥ (m·DV − 100·CV)·100 / (100·m − G)`.
//! That repayment is rounded up to whole debt units and the matching
//! extract is rounded down, so the vault always ends Safe unless the
//! collateral runs out first.

use crate::engine::VaultEngine;
use crate::error::{EngineError, EngineResult};
use crate::events::Event;
use crate::interfaces::{Asset, VaultOwnership};
use crate::math::{
    div_ceil, max_u128, min_u128, mul_u128, product_ratio, sub_u128, wide_product, Rounding,
    BPS_SCALE, PERCENT, U256,
};
use crate::oracle::Prices;
use crate::params::Params;
use crate::ratio::{collateralization_percentage, is_safe};
use crate::state::{Address, Vault, VaultId};

/// What a liquidation of one vault would cost and pay at current prices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiquidationQuote {
    /// Debt the liquidator repays
    pub cost: u128,
    /// Collateral credited to the liquidator
    pub extract: u128,
    /// Extract was limited by the vault's collateral; residual debt remains
    pub capped: bool,
}

impl LiquidationQuote {
    pub fn is_empty(&self) -> bool {
        self.cost == 0 && self.extract == 0
    }
}

/// Whether a vault is below the minimum ratio
pub fn is_liquidatable(vault: &Vault, prices: &Prices, params: &Params) -> EngineResult<bool> {
    let ratio = collateralization_percentage(vault.collateral, vault.debt, prices)?;
    Ok(!is_safe(ratio, params.min_collateral_percentage))
}

/// Cost and extract for liquidating `vault`; zero when the vault is Safe
pub fn quote(vault: &Vault, prices: &Prices, params: &Params) -> EngineResult<LiquidationQuote> {
    if !is_liquidatable(vault, prices, params)? {
        return Ok(LiquidationQuote::default());
    }

    let debt = vault.debt;
    let mut cost = min_u128(restoring_cost(vault, prices, params)?, debt);

    // Close factor: never less than debt / debt_ratio
    if params.debt_ratio > 0 {
        cost = min_u128(max_u128(cost, div_ceil(debt, params.debt_ratio)), debt);
    }

    // Do not leave a dust position behind
    let remaining = debt - cost;
    if remaining != 0 && remaining < params.min_debt {
        cost = debt;
    }

    // An extract too large to represent is certainly above the collateral
    let extract = match product_ratio(
        &[cost, prices.token, params.gain_ratio_bps],
        &[prices.collateral, BPS_SCALE],
        Rounding::Down,
    ) {
        Ok(extract) => Some(extract),
        Err(EngineError::ArithmeticOverflow) => None,
        Err(e) => return Err(e),
    };

    if let Some(extract) = extract.filter(|e| *e <= vault.collateral) {
        return Ok(LiquidationQuote {
            cost,
            extract,
            capped: false,
        });
    }

    // Not enough collateral: pay out all of it and charge proportionally
    let cost = min_u128(
        product_ratio(
            &[vault.collateral, prices.collateral, BPS_SCALE],
            &[prices.token, params.gain_ratio_bps],
            Rounding::Up,
        )?,
        debt,
    );
    Ok(LiquidationQuote {
        cost,
        extract: vault.collateral,
        capped: true,
    })
}

/// Smallest debt repayment that brings the vault back to the minimum ratio,
/// or the whole debt when no partial repayment can.
fn restoring_cost(vault: &Vault, prices: &Prices, params: &Params) -> EngineResult<u128> {
    let m = params.min_collateral_percentage;
    let m100 = mul_u128(m, PERCENT)?;
    if m100 <= params.gain_ratio_bps {
        // Each repaid unit removes at least as much value as it frees up
        return Ok(vault.debt);
    }

    let required = wide_product(&[m, vault.debt, prices.token])?;
    let held = wide_product(&[PERCENT, vault.collateral, prices.collateral])?;
    if held >= required {
        return Ok(0);
    }
    let deficit = (required - held)
        .checked_mul(U256::from(PERCENT))
        .ok_or(EngineError::ArithmeticOverflow)?;
    let per_unit = wide_product(&[m100 - params.gain_ratio_bps, prices.token])?;

    let (q, r) = deficit.div_mod(per_unit);
    let q = if r.is_zero() {
        q
    } else {
        q.checked_add(U256::one())
            .ok_or(EngineError::ArithmeticOverflow)?
    };
    if q >= U256::from(vault.debt) {
        return Ok(vault.debt);
    }
    Ok(q.as_u128())
}

impl<C, D, N> VaultEngine<C, D, N>
where
    C: Asset,
    D: Asset,
    N: VaultOwnership,
{
    /// Whether a vault is below the minimum collateralization percentage
    pub fn check_liquidation(&self, id: VaultId) -> EngineResult<bool> {
        let vault = self.require_vault(id)?;
        if vault.debt == 0 {
            return Ok(false);
        }
        let prices = self.prices()?;
        is_liquidatable(&vault, &prices, &self.config.params)
    }

    /// Debt a liquidator must repay; 0 when the vault is Safe
    pub fn check_cost(&self, id: VaultId) -> EngineResult<u128> {
        Ok(self.liquidation_quote(id)?.cost)
    }

    /// Collateral a liquidator receives for [`VaultEngine::check_cost`]; 0 when Safe
    pub fn check_extract(&self, id: VaultId) -> EngineResult<u128> {
        Ok(self.liquidation_quote(id)?.extract)
    }

    pub fn liquidation_quote(&self, id: VaultId) -> EngineResult<LiquidationQuote> {
        let vault = self.require_vault(id)?;
        if vault.debt == 0 {
            return Ok(LiquidationQuote::default());
        }
        let prices = self.prices()?;
        quote(&vault, &prices, &self.config.params)
    }

    /// Repay part of an under-collateralized vault's debt in exchange for a
    /// discounted share of its collateral, credited to the caller's reward
    /// balance. Returns the quote that was applied.
    pub fn liquidate_vault(&mut self, caller: &Address, id: VaultId) -> EngineResult<LiquidationQuote> {
        let vault = self.require_vault(id)?;
        if vault.debt == 0 {
            return Err(EngineError::NotLiquidatable(id));
        }
        let prices = self.prices()?;
        if !is_liquidatable(&vault, &prices, &self.config.params)? {
            return Err(EngineError::NotLiquidatable(id));
        }

        if let Some(pool) = self.config.params.stability_pool {
            if pool != *caller {
                return Err(EngineError::LiquidationRestricted);
            }
        }

        if vault.collateral == 0 {
            return Err(EngineError::InsufficientVaultCollateral(id));
        }

        let q = quote(&vault, &prices, &self.config.params)?;

        let balance = self.debt.balance_of(caller);
        if balance < q.cost {
            return Err(EngineError::InsufficientLiquidatorBalance {
                balance,
                cost: q.cost,
            });
        }

        let liquidator = *caller;
        self.atomically(&[id], &[liquidator], |engine| {
            engine.state.sub_debt(id, q.cost)?;
            let v = engine.state.vault_mut(id)?;
            v.collateral = sub_u128(v.collateral, q.extract)?;
            engine.state.rewards.credit(liquidator, q.extract)?;
            engine
                .debt
                .transfer_from(&engine.address, &liquidator, &engine.address, q.cost)?;
            engine.emit(Event::VaultLiquidated {
                id,
                liquidator,
                cost: q.cost,
                extract: q.extract,
            });
            Ok(())
        })?;

        log::info!(
            "Liquidate: vault {} by {}: repaid {}, extracted {}{}",
            id,
            caller,
            q.cost,
            q.extract,
            if q.capped { " (capped)" } else { "" }
        );
        Ok(q)
    }
}
