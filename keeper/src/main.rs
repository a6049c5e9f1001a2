//! Vault Liquidation Keeper
//!
//! Drives a vault engine through a scripted collateral price path, watches
//! vault health and liquidates vaults that fall below the minimum ratio.

mod config;
mod health;
mod priority_queue;

use anyhow::{Context, Result};
use config::Config;
use priority_queue::HealthQueue;
use serde::Serialize;
use std::time::Duration;
use tokio::time;
use vault_engine::memory::{ManualPriceFeed, MemoryEngine};
use vault_engine::{Address, Asset, OracleAdapter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // `vault-keeper init [path]` writes a config template and exits
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("init") {
        let path = args.get(2).map(String::as_str).unwrap_or("keeper-config.toml");
        return Config::write_default(path);
    }

    log::info!("Starting Vault Liquidation Keeper");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using built-in simulation", e);
        Config::default_simulation()
    });

    let summary = run(config).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
    );
    Ok(())
}

/// Totals reported when the price path is exhausted
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub ticks: usize,
    pub liquidations: usize,
    pub skipped: usize,
    pub failed: usize,
    pub debt_repaid: u128,
    pub collateral_claimed: u128,
    pub at_risk_warnings: usize,
    pub audit_failures: usize,
    pub open_vaults: usize,
    pub total_borrowed: u128,
}

struct Keeper {
    engine: MemoryEngine,
    feed: ManualPriceFeed,
    address: Address,
    queue: HealthQueue,
    summary: Summary,
}

impl Keeper {
    /// Deploy an in-memory engine and open the configured vaults
    fn deploy(config: &Config) -> Result<Self> {
        let opening = *config.price_path.first().context("price_path is empty")?;
        let feed = ManualPriceFeed::new(opening as u128, config.price_decimals);
        let owner = Address::from_label(&config.owner);
        let oracle = OracleAdapter::new(Box::new(feed.clone()));

        let mut engine = MemoryEngine::in_memory(owner, config.engine.clone(), oracle);
        engine.fund_float(config.base_units(config.float)?);

        let address = Address::from_label(&config.keeper);
        engine.fund_debt(&address, config.base_units(config.keeper_balance)?);
        log::info!("Keeper wallet: {}", address);

        for seed in &config.vaults {
            let who = Address::from_label(&seed.owner);
            let collateral = config.base_units(seed.collateral)?;
            engine.fund_collateral(&who, collateral);

            let id = engine
                .create_vault(&who)
                .context(format!("Failed to open vault for {}", seed.owner))?;
            engine
                .deposit_collateral(&who, id, collateral)
                .context(format!("Failed to fund vault {}", id))?;
            if seed.debt > 0 {
                engine
                    .borrow_token(&who, id, config.base_units(seed.debt)?)
                    .context(format!("Failed to borrow against vault {}", id))?;
            }
            log::info!(
                "Seeded vault {} for {}: {} collateral, {} debt",
                id,
                seed.owner,
                seed.collateral,
                seed.debt
            );
        }
        engine.take_events();

        Ok(Self {
            engine,
            feed,
            address,
            queue: HealthQueue::new(),
            summary: Summary::default(),
        })
    }

    fn tick(&mut self, price: u64, config: &Config) -> Result<()> {
        self.summary.ticks += 1;
        self.feed.set(price as u128);

        let snapshots = health::scan(&self.engine).context("Failed to scan vaults")?;
        self.queue.refresh(snapshots);

        for vh in self.queue.get_at_risk(config.warning_buffer.into()) {
            log::warn!("Vault {} at risk: ratio {}%", vh.id, vh.ratio);
            self.summary.at_risk_warnings += 1;
        }

        self.process_liquidations(config.max_liquidations_per_batch);
        self.claim_rewards()?;
        self.audit();

        let events = self.engine.take_events();
        log::debug!("Tick {}: {} events", self.summary.ticks, events.len());
        Ok(())
    }

    /// Liquidate the worst vaults, up to `batch_size`
    fn process_liquidations(&mut self, batch_size: usize) {
        let liquidatable = self.queue.get_liquidatable();
        if liquidatable.is_empty() {
            log::debug!("No vaults need liquidation");
            return;
        }

        log::info!("Found {} vaults needing liquidation", liquidatable.len());

        for vh in liquidatable.iter().take(batch_size) {
            let quote = match self.engine.liquidation_quote(vh.id) {
                Ok(q) => q,
                Err(e) => {
                    log::error!("Failed to quote vault {}: {}", vh.id, e);
                    self.summary.failed += 1;
                    continue;
                }
            };

            let balance = self.engine.debt_asset().balance_of(&self.address);
            if quote.cost > balance {
                log::warn!(
                    "Skipping vault {}: costs {}, keeper holds {}",
                    vh.id,
                    quote.cost,
                    balance
                );
                self.summary.skipped += 1;
                continue;
            }

            log::info!(
                "Liquidating vault {} of {} (ratio: {}%, collateral {}, debt {})",
                vh.id,
                vh.owner.map(|o| o.to_string()).unwrap_or_else(|| "unknown".to_string()),
                vh.ratio,
                vh.collateral,
                vh.debt
            );
            match self.engine.liquidate_vault(&self.address, vh.id) {
                Ok(applied) => {
                    self.summary.liquidations += 1;
                    self.summary.debt_repaid = self.summary.debt_repaid.saturating_add(applied.cost);
                    match health::vault_health(&self.engine, vh.id) {
                        Ok(after) if after.debt > 0 => {
                            self.queue.update(after);
                        }
                        _ => {
                            self.queue.remove(&vh.id);
                        }
                    }
                }
                Err(e) => {
                    log::error!("Failed to liquidate vault {}: {}", vh.id, e);
                    self.summary.failed += 1;
                }
            }
        }
    }

    fn claim_rewards(&mut self) -> Result<()> {
        if self.engine.claimable(&self.address) == 0 {
            return Ok(());
        }
        let paid = self
            .engine
            .get_paid(&self.address)
            .context("Failed to claim rewards")?;
        self.summary.collateral_claimed = self.summary.collateral_claimed.saturating_add(paid);
        Ok(())
    }

    fn audit(&mut self) {
        let audit = self.engine.audit();
        if !audit.ok() {
            log::error!("Ledger audit failed: {:?}", audit);
            self.summary.audit_failures += 1;
        }
    }

    fn finish(mut self) -> Summary {
        self.summary.open_vaults = self.engine.state().live_count();
        self.summary.total_borrowed = self.engine.total_borrowed();
        self.summary
    }
}

/// Run the configured price path to completion
async fn run(config: Config) -> Result<Summary> {
    let mut keeper = Keeper::deploy(&config)?;

    log::info!("Keeper service started. Monitoring {} vaults...", keeper.engine.vault_ids().len());

    let mut interval = time::interval(Duration::from_millis(config.poll_interval_ms.max(1)));

    for price in &config.price_path {
        interval.tick().await;

        if let Err(e) = keeper.tick(*price, &config) {
            log::error!("Error processing tick: {:#}", e);
        }

        if !keeper.queue.is_empty() {
            log::debug!("Health queue size: {}", keeper.queue.len());

            if let Some(worst) = keeper.queue.peek() {
                log::debug!("Worst vault: {} at {}%", worst.id, worst.ratio);
            }
        }
    }

    let summary = keeper.finish();
    log::info!(
        "Price path exhausted: {} liquidations, {} collateral claimed",
        summary.liquidations,
        summary.collateral_claimed
    );
    Ok(summary)
}
