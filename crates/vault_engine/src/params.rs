//! Owner-controlled engine parameters

use crate::oracle::PRICE_DECIMALS;
use crate::state::{Address, VaultId};
use serde::{Deserialize, Serialize};

/// Default minimum collateralization percentage
pub const DEFAULT_MIN_COLLATERAL_PERCENTAGE: u128 = 130;

/// Default closing fee (0.5%)
pub const DEFAULT_CLOSING_FEE_BPS: u128 = 50;

/// Default close-factor denominator: at least half the debt per liquidation
pub const DEFAULT_DEBT_RATIO: u128 = 2;

/// Default liquidator gain (110% of repaid value)
pub const DEFAULT_GAIN_RATIO_BPS: u128 = 11_000;

/// Default debt-token peg ($1.00 at 8 decimals)
pub const DEFAULT_TOKEN_PEG: u128 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Minimum collateralization, in percent (130 = 130%)
    #[serde(with = "amount")]
    pub min_collateral_percentage: u128,

    /// Smallest nonzero debt a vault may carry (debt base units)
    #[serde(with = "amount")]
    pub min_debt: u128,

    /// Closing fee charged on repayment, in bps of repaid value
    #[serde(with = "amount")]
    pub closing_fee_bps: u128,

    /// Close-factor denominator; a liquidation repays at least debt / debt_ratio.
    /// Zero disables the floor.
    #[serde(with = "amount")]
    pub debt_ratio: u128,

    /// Collateral paid per unit of repaid value, in bps (11_000 = 1.1x)
    #[serde(with = "amount")]
    pub gain_ratio_bps: u128,

    /// Fixed debt-token price used when no token price source is installed
    #[serde(with = "amount")]
    pub token_peg: u128,

    /// Decimals of `token_peg`
    pub token_peg_decimals: u8,

    /// When set, only this address may liquidate
    pub stability_pool: Option<Address>,

    /// Vault that receives closing fees
    pub treasury: Option<VaultId>,

    /// Metadata URI for the vault collection
    pub uri: String,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_collateral_percentage: DEFAULT_MIN_COLLATERAL_PERCENTAGE,
            min_debt: 0,
            closing_fee_bps: DEFAULT_CLOSING_FEE_BPS,
            debt_ratio: DEFAULT_DEBT_RATIO,
            gain_ratio_bps: DEFAULT_GAIN_RATIO_BPS,
            token_peg: DEFAULT_TOKEN_PEG,
            token_peg_decimals: PRICE_DECIMALS,
            stability_pool: None,
            treasury: None,
            uri: String::new(),
        }
    }
}

/// Serde adapter for u128 amounts in TOML, whose integers are 64-bit.
/// Values that do not fit an i64 are written as decimal strings.
pub mod amount {
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, s: S) -> Result<S::Ok, S::Error> {
        match i64::try_from(*value) {
            Ok(small) => s.serialize_i64(small),
            Err(_) => s.serialize_str(&value.to_string()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        d.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> de::Visitor<'de> for AmountVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(v as u128)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("negative amount {}", v)))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.replace('_', "").parse().map_err(E::custom)
        }
    }
}

/// Deployment-time description of an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Vault collection name
    pub name: String,
    /// Vault collection symbol
    pub symbol: String,
    #[serde(default)]
    pub params: Params,
}

impl EngineConfig {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            params,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("Collateral Vault", "CVLT", Params::default())
    }
}
