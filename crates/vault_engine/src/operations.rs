//! Vault lifecycle and collateral/debt operations
//!
//! Every operation validates first, then mutates the ledger, and only then
//! calls out to an external collaborator. A failing call-out rolls the
//! ledger back (see `VaultEngine::atomically`).

use crate::engine::VaultEngine;
use crate::error::{EngineError, EngineResult};
use crate::events::Event;
use crate::interfaces::{Asset, VaultOwnership};
use crate::math::{add_u128, min_u128, product_ratio, sub_u128, Rounding, BPS_SCALE};
use crate::oracle::Prices;
use crate::ratio::{collateralization_percentage, is_safe};
use crate::state::{Address, VaultId};

impl<C, D, N> VaultEngine<C, D, N>
where
    C: Asset,
    D: Asset,
    N: VaultOwnership,
{
    /// Open an empty vault owned by `caller`
    pub fn create_vault(&mut self, caller: &Address) -> EngineResult<VaultId> {
        let id = self.state.next_id();
        let owner = *caller;

        self.atomically(&[id], &[], |engine| {
            let opened = engine.state.open_vault();
            debug_assert_eq!(opened, id);
            engine.registry.mint(&owner, id)?;
            engine.emit(Event::VaultCreated { id, owner });
            Ok(())
        })?;

        log::debug!("CreateVault: vault {} for {}", id, caller);
        Ok(id)
    }

    /// Remove a debt-free vault. Remaining collateral is not returned.
    pub fn destroy_vault(&mut self, caller: &Address, id: VaultId) -> EngineResult<()> {
        let vault = self.require_vault_owner(caller, id)?;
        if vault.debt != 0 {
            return Err(EngineError::OutstandingDebt(id));
        }
        if vault.collateral != 0 {
            log::warn!(
                "DestroyVault: vault {} abandoned with {} collateral",
                id,
                vault.collateral
            );
        }

        self.atomically(&[id], &[], |engine| {
            engine.state.close_vault(id)?;
            engine.registry.burn(id)?;
            engine.emit(Event::VaultDestroyed { id });
            Ok(())
        })?;

        log::debug!("DestroyVault: vault {}", id);
        Ok(())
    }

    /// Hand a vault to another owner through the ownership registry
    pub fn transfer_vault(&mut self, caller: &Address, id: VaultId, to: &Address) -> EngineResult<()> {
        self.require_vault_owner(caller, id)?;
        let (from, to) = (*caller, *to);

        self.atomically(&[], &[], |engine| {
            engine.registry.transfer(&from, &to, id)?;
            engine.emit(Event::VaultTransferred { id, from, to });
            Ok(())
        })
    }

    /// Add collateral to any vault; the caller pays
    pub fn deposit_collateral(&mut self, caller: &Address, id: VaultId, amount: u128) -> EngineResult<()> {
        let vault = self.require_vault(id)?;
        let collateral = add_u128(vault.collateral, amount)?;
        let from = *caller;

        self.atomically(&[id], &[], |engine| {
            engine.state.vault_mut(id)?.collateral = collateral;
            engine
                .collateral
                .transfer_from(&engine.address, &from, &engine.address, amount)?;
            engine.emit(Event::CollateralDeposited { id, amount });
            Ok(())
        })?;

        log::debug!("Deposit: vault {} +{} collateral", id, amount);
        Ok(())
    }

    /// Take collateral out of an owned vault, keeping it above the minimum ratio
    pub fn withdraw_collateral(&mut self, caller: &Address, id: VaultId, amount: u128) -> EngineResult<()> {
        let vault = self.require_vault_owner(caller, id)?;
        if amount > vault.collateral {
            return Err(EngineError::InsufficientCollateral {
                available: vault.collateral,
                requested: amount,
            });
        }
        let collateral = vault.collateral - amount;

        if vault.debt > 0 {
            let prices = self.prices()?;
            self.require_min_ratio(collateral, vault.debt, &prices)?;
        }

        let to = *caller;
        self.atomically(&[id], &[], |engine| {
            engine.state.vault_mut(id)?.collateral = collateral;
            engine.collateral.transfer(&engine.address, &to, amount)?;
            engine.emit(Event::CollateralWithdrawn { id, amount });
            Ok(())
        })?;

        log::debug!("Withdraw: vault {} -{} collateral", id, amount);
        Ok(())
    }

    /// Borrow debt tokens against an owned vault
    pub fn borrow_token(&mut self, caller: &Address, id: VaultId, amount: u128) -> EngineResult<()> {
        let vault = self.require_vault_owner(caller, id)?;
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        let debt = add_u128(vault.debt, amount)?;

        let prices = self.prices()?;
        self.require_min_ratio(vault.collateral, debt, &prices)?;

        let min_debt = self.config.params.min_debt;
        if debt < min_debt {
            return Err(EngineError::BelowMinimumDebt {
                debt,
                minimum: min_debt,
            });
        }

        let to = *caller;
        self.atomically(&[id], &[], |engine| {
            engine.state.add_debt(id, amount)?;
            engine.debt.transfer(&engine.address, &to, amount)?;
            engine.emit(Event::TokenBorrowed { id, amount });
            Ok(())
        })?;

        log::debug!("Borrow: vault {} +{} debt (total {})", id, amount, debt);
        Ok(())
    }

    /// Repay debt of any vault; a closing fee moves from the vault's
    /// collateral to the treasury vault. Returns the fee charged.
    pub fn pay_back_token(&mut self, caller: &Address, id: VaultId, amount: u128) -> EngineResult<u128> {
        let vault = self.require_vault(id)?;
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        if amount > vault.debt {
            return Err(EngineError::ExceedsDebt {
                amount,
                debt: vault.debt,
            });
        }
        let remaining = vault.debt - amount;
        let min_debt = self.config.params.min_debt;
        if remaining != 0 && remaining < min_debt {
            return Err(EngineError::BelowMinimumDebt {
                debt: remaining,
                minimum: min_debt,
            });
        }

        let prices = self.prices()?;
        let treasury = self.fee_destination();
        let fee = match treasury {
            Some(_) => min_u128(self.closing_fee(amount, &prices)?, vault.collateral),
            None => 0,
        };

        let from = *caller;
        let touched: Vec<VaultId> = std::iter::once(id).chain(treasury).collect();
        self.atomically(&touched, &[], |engine| {
            engine.state.sub_debt(id, amount)?;
            if let Some(treasury) = treasury {
                let v = engine.state.vault_mut(id)?;
                v.collateral = sub_u128(v.collateral, fee)?;
                let t = engine.state.vault_mut(treasury)?;
                t.collateral = add_u128(t.collateral, fee)?;
            }
            engine
                .debt
                .transfer_from(&engine.address, &from, &engine.address, amount)?;
            engine.emit(Event::TokenRepaid { id, amount, fee });
            Ok(())
        })?;

        log::debug!(
            "PayBack: vault {} -{} debt, closing fee {} collateral",
            id,
            amount,
            fee
        );
        Ok(fee)
    }

    /// Closing fee, in collateral, for repaying `amount` at current prices
    pub fn closing_fee_for(&self, amount: u128) -> EngineResult<u128> {
        let prices = self.prices()?;
        self.closing_fee(amount, &prices)
    }

    /// `amount * token_price * fee_bps / (collateral_price * 10_000)`
    fn closing_fee(&self, amount: u128, prices: &Prices) -> EngineResult<u128> {
        product_ratio(
            &[amount, prices.token, self.config.params.closing_fee_bps],
            &[prices.collateral, BPS_SCALE],
            Rounding::Down,
        )
    }

    /// Treasury vault that receives fees, if configured and still open
    fn fee_destination(&self) -> Option<VaultId> {
        let treasury = self.config.params.treasury?;
        if self.state.contains(treasury) {
            Some(treasury)
        } else {
            log::warn!("PayBack: treasury vault {} no longer exists, fee skipped", treasury);
            None
        }
    }

    fn require_min_ratio(&self, collateral: u128, debt: u128, prices: &Prices) -> EngineResult<()> {
        let minimum = self.config.params.min_collateral_percentage;
        let ratio = collateralization_percentage(collateral, debt, prices)?;
        if !is_safe(ratio, minimum) {
            return Err(EngineError::BelowMinimumRatio { ratio, minimum });
        }
        Ok(())
    }
}
