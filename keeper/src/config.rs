//! Keeper configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vault_engine::params::amount;
use vault_engine::{EngineConfig, Params};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Label the keeper's address is derived from
    pub keeper: String,

    /// Engine owner label
    pub owner: String,

    /// Tick interval in milliseconds
    pub poll_interval_ms: u64,

    /// Maximum liquidations per tick
    pub max_liquidations_per_batch: usize,

    /// Percentage points above the minimum ratio that count as at risk
    pub warning_buffer: i64,

    /// Decimals of every amount below
    pub token_decimals: u8,

    /// Decimals of the prices in `price_path`
    pub price_decimals: u8,

    /// Collateral price for each tick; the first one is the opening price
    pub price_path: Vec<u64>,

    /// Debt tokens the engine can lend, in whole tokens
    #[serde(with = "amount")]
    pub float: u128,

    /// Debt tokens the keeper starts with, in whole tokens
    #[serde(with = "amount")]
    pub keeper_balance: u128,

    /// Vaults opened before the first tick
    #[serde(default)]
    pub vaults: Vec<SeedVault>,

    pub engine: EngineConfig,
}

/// Vault opened at startup, amounts in whole tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedVault {
    pub owner: String,
    #[serde(with = "amount")]
    pub collateral: u128,
    #[serde(with = "amount")]
    pub debt: u128,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("KEEPER_CONFIG")
            .unwrap_or_else(|_| "keeper-config.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let config_str = std::fs::read_to_string(expanded.as_ref())
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Built-in simulation: three vaults and a falling collateral price
    pub fn default_simulation() -> Self {
        Self {
            keeper: "keeper".to_string(),
            owner: "governance".to_string(),
            poll_interval_ms: 250,
            max_liquidations_per_batch: 5,
            warning_buffer: 10,
            token_decimals: 18,
            price_decimals: 8,
            price_path: [2_000u64, 1_900, 1_800, 1_700, 1_600, 1_500, 1_400, 1_300]
                .iter()
                .map(|usd| usd * 100_000_000)
                .collect(),
            float: 1_000_000,
            keeper_balance: 50_000,
            vaults: vec![
                SeedVault {
                    owner: "alice".to_string(),
                    collateral: 10,
                    debt: 10_000,
                },
                SeedVault {
                    owner: "bob".to_string(),
                    collateral: 5,
                    debt: 7_000,
                },
                SeedVault {
                    owner: "carol".to_string(),
                    collateral: 20,
                    debt: 20_000,
                },
            ],
            engine: EngineConfig {
                params: Params {
                    min_debt: 100 * 10u128.pow(18),
                    ..Params::default()
                },
                ..EngineConfig::default()
            },
        }
    }

    /// Scale a whole-token amount to base units
    pub fn base_units(&self, whole: u128) -> Result<u128> {
        10u128
            .checked_pow(self.token_decimals as u32)
            .and_then(|scale| whole.checked_mul(scale))
            .context(format!("Amount {} overflows at {} decimals", whole, self.token_decimals))
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_simulation();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
