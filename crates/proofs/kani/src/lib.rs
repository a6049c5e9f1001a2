//! Kani proofs for the vault engine's ratio, liquidation and ledger invariants

#![cfg_attr(kani, feature(register_tool), register_tool(kanitool))]

pub mod sanitizer;
pub mod generators;
pub mod adversary;

#[cfg(kani)]
pub mod safety;

#[cfg(kani)]
pub mod liquidation;
