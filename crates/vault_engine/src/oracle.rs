//! Price oracle adapter
//!
//! Wraps the collateral price source and the optional debt-token price
//! source, and normalizes every read to [`PRICE_DECIMALS`].

use crate::error::{EngineError, EngineResult, OracleError};
use crate::math::rescale;
use crate::params::Params;

/// Decimal precision of every normalized price
pub const PRICE_DECIMALS: u8 = 8;

/// Raw reading from a price source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub value: u128,
    pub decimals: u8,
}

impl Price {
    pub const fn new(value: u128, decimals: u8) -> Self {
        Self { value, decimals }
    }

    /// Value rescaled to [`PRICE_DECIMALS`]
    pub fn normalized(&self) -> EngineResult<u128> {
        rescale(self.value, self.decimals, PRICE_DECIMALS)
    }
}

/// Read-only external price feed
pub trait PriceSource {
    fn current_price(&self) -> Result<Price, OracleError>;
}

impl<F> PriceSource for F
where
    F: Fn() -> Result<Price, OracleError>,
{
    fn current_price(&self) -> Result<Price, OracleError> {
        self()
    }
}

/// Normalized prices used by one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prices {
    /// Collateral asset price, 8 decimals
    pub collateral: u128,
    /// Debt token price, 8 decimals
    pub token: u128,
}

pub struct OracleAdapter {
    collateral_source: Box<dyn PriceSource>,
    token_source: Option<Box<dyn PriceSource>>,
}

impl OracleAdapter {
    pub fn new(collateral_source: Box<dyn PriceSource>) -> Self {
        Self {
            collateral_source,
            token_source: None,
        }
    }

    pub fn with_token_source(mut self, source: Box<dyn PriceSource>) -> Self {
        self.token_source = Some(source);
        self
    }

    pub fn set_collateral_source(&mut self, source: Box<dyn PriceSource>) {
        self.collateral_source = source;
    }

    /// Install a token price source; `None` falls back to the configured peg
    pub fn set_token_source(&mut self, source: Option<Box<dyn PriceSource>>) {
        self.token_source = source;
    }

    pub fn has_token_source(&self) -> bool {
        self.token_source.is_some()
    }

    /// Collateral price at 8 decimals
    pub fn collateral_price(&self) -> EngineResult<u128> {
        let raw = self.collateral_source.current_price()?;
        non_zero(raw.normalized()?, "collateral price is zero")
    }

    /// Debt-token price at 8 decimals: the token source if installed, else the peg
    pub fn token_price(&self, params: &Params) -> EngineResult<u128> {
        let raw = match &self.token_source {
            Some(source) => source.current_price()?,
            None => Price::new(params.token_peg, params.token_peg_decimals),
        };
        non_zero(raw.normalized()?, "token price is zero")
    }

    pub fn prices(&self, params: &Params) -> EngineResult<Prices> {
        Ok(Prices {
            collateral: self.collateral_price()?,
            token: self.token_price(params)?,
        })
    }
}

fn non_zero(value: u128, what: &'static str) -> EngineResult<u128> {
    if value == 0 {
        log::warn!("Oracle: {}", what);
        return Err(EngineError::InvalidPrice(what));
    }
    Ok(value)
}
