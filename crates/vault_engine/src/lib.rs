//! Collateralized debt position engine
//! Pure Rust, no chain SDK, no unwrap/panic on operation paths

pub mod error;
pub mod math;
pub mod state;
pub mod rewards;
pub mod params;
pub mod oracle;
pub mod ratio;
pub mod interfaces;
pub mod events;
pub mod engine;
pub mod operations;
pub mod liquidation;
pub mod admin;
pub mod invariants;
pub mod memory;

// Re-export commonly used types
pub use engine::VaultEngine;
pub use error::*;
pub use events::Event;
pub use interfaces::{Asset, VaultOwnership};
pub use invariants::Audit;
pub use liquidation::{is_liquidatable, quote, LiquidationQuote};
pub use memory::MemoryEngine;
pub use oracle::{OracleAdapter, Price, PriceSource, Prices, PRICE_DECIMALS};
pub use params::*;
pub use ratio::{collateralization_percentage, is_safe, UNBOUNDED_RATIO};
pub use state::*;
