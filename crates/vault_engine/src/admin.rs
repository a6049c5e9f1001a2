//! Parameter store: owner-gated setters
//!
//! Values are taken as given; the only check besides ownership is that a
//! treasury vault must exist when it is set.

use crate::engine::VaultEngine;
use crate::error::{EngineError, EngineResult};
use crate::events::Event;
use crate::interfaces::{Asset, VaultOwnership};
use crate::oracle::PriceSource;
use crate::state::{Address, VaultId};

impl<C, D, N> VaultEngine<C, D, N>
where
    C: Asset,
    D: Asset,
    N: VaultOwnership,
{
    pub fn set_debt_ratio(&mut self, caller: &Address, debt_ratio: u128) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.config.params.debt_ratio = debt_ratio;
        self.parameter_changed("debt_ratio", debt_ratio);
        Ok(())
    }

    pub fn set_gain_ratio(&mut self, caller: &Address, gain_ratio_bps: u128) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.config.params.gain_ratio_bps = gain_ratio_bps;
        self.parameter_changed("gain_ratio", gain_ratio_bps);
        Ok(())
    }

    pub fn set_min_collateral_ratio(&mut self, caller: &Address, percentage: u128) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.config.params.min_collateral_percentage = percentage;
        self.parameter_changed("min_collateral_percentage", percentage);
        Ok(())
    }

    pub fn set_min_debt(&mut self, caller: &Address, min_debt: u128) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.config.params.min_debt = min_debt;
        self.parameter_changed("min_debt", min_debt);
        Ok(())
    }

    pub fn set_closing_fee(&mut self, caller: &Address, fee_bps: u128) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.config.params.closing_fee_bps = fee_bps;
        self.parameter_changed("closing_fee", fee_bps);
        Ok(())
    }

    /// Fixed debt-token price used while no token price source is installed
    pub fn set_token_peg(&mut self, caller: &Address, value: u128, decimals: u8) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.config.params.token_peg = value;
        self.config.params.token_peg_decimals = decimals;
        self.parameter_changed("token_peg", format!("{} ({} decimals)", value, decimals));
        Ok(())
    }

    /// Restrict liquidation to `pool`, or open it to anyone with `None`
    pub fn set_stability_pool(&mut self, caller: &Address, pool: Option<Address>) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.config.params.stability_pool = pool;
        match pool {
            Some(pool) => self.parameter_changed("stability_pool", pool),
            None => self.parameter_changed("stability_pool", "unset"),
        }
        Ok(())
    }

    /// Vault that receives closing fees; it must exist
    pub fn set_treasury(&mut self, caller: &Address, id: VaultId) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.require_vault(id)?;
        self.config.params.treasury = Some(id);
        self.parameter_changed("treasury", id);
        Ok(())
    }

    pub fn set_uri(&mut self, caller: &Address, uri: impl Into<String>) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.config.params.uri = uri.into();
        let uri = self.config.params.uri.clone();
        self.parameter_changed("uri", uri);
        Ok(())
    }

    pub fn set_collateral_price_source(
        &mut self,
        caller: &Address,
        source: Box<dyn PriceSource>,
    ) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.oracle.set_collateral_source(source);
        self.parameter_changed("collateral_price_source", "replaced");
        Ok(())
    }

    /// Install a debt-token price source; `None` reverts to the fixed peg
    pub fn set_token_price_source(
        &mut self,
        caller: &Address,
        source: Option<Box<dyn PriceSource>>,
    ) -> EngineResult<()> {
        self.require_owner(caller)?;
        let label = if source.is_some() { "replaced" } else { "peg" };
        self.oracle.set_token_source(source);
        self.parameter_changed("token_price_source", label);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> EngineResult<()> {
        self.require_owner(caller)?;
        self.owner = new_owner;
        self.parameter_changed("owner", new_owner);
        Ok(())
    }

    fn require_owner(&self, caller: &Address) -> EngineResult<()> {
        if *caller != self.owner {
            return Err(EngineError::NotOwner);
        }
        Ok(())
    }

    fn parameter_changed(&mut self, name: &'static str, value: impl std::fmt::Display) {
        log::info!("Params: {} set to {}", name, value);
        self.emit(Event::ParameterChanged { name });
    }
}
