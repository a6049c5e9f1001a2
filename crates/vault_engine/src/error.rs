//! Error types for the vault engine

use crate::state::VaultId;
use thiserror::Error;

/// Failure reported by an external asset (collateral or debt token)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: u128, required: u128 },
    #[error("insufficient allowance: have {available}, need {required}")]
    InsufficientAllowance { available: u128, required: u128 },
    #[error("transfer rejected by asset")]
    Rejected,
}

/// Failure reported by the vault ownership registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OwnershipError {
    #[error("vault {0} already minted")]
    AlreadyMinted(VaultId),
    #[error("vault {0} has no owner")]
    NotMinted(VaultId),
    #[error("vault {0} is not held by the sender")]
    WrongOwner(VaultId),
}

/// Failure reported by a price source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("price source unavailable: {0}")]
    Unavailable(String),
    #[error("price source reported {decimals} decimals")]
    UnsupportedDecimals { decimals: u8 },
}

/// Every way a public engine operation can fail.
///
/// Any error aborts the whole operation; the ledger is left exactly as it
/// was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("vault {0} does not exist")]
    VaultNotFound(VaultId),
    #[error("caller is not the owner")]
    NotOwner,
    #[error("vault {0} still has outstanding debt")]
    OutstandingDebt(VaultId),
    #[error("amount must be non-zero")]
    ZeroAmount,
    #[error("insufficient collateral: have {available}, requested {requested}")]
    InsufficientCollateral { available: u128, requested: u128 },
    #[error("collateral ratio {ratio}% below minimum {minimum}%")]
    BelowMinimumRatio { ratio: u128, minimum: u128 },
    #[error("debt {debt} below minimum debt {minimum}")]
    BelowMinimumDebt { debt: u128, minimum: u128 },
    #[error("repayment {amount} exceeds vault debt {debt}")]
    ExceedsDebt { amount: u128, debt: u128 },
    #[error("liquidator holds {balance}, liquidation costs {cost}")]
    InsufficientLiquidatorBalance { balance: u128, cost: u128 },
    #[error("vault {0} has no collateral to extract")]
    InsufficientVaultCollateral(VaultId),
    #[error("vault {0} is not liquidatable")]
    NotLiquidatable(VaultId),
    #[error("liquidation is restricted to the stability pool")]
    LiquidationRestricted,
    #[error("nothing to claim")]
    NothingToClaim,
    #[error("asset transfer failed: {0}")]
    TransferFailed(TransferError),
    #[error("asset transfer not approved: {0}")]
    InsufficientAllowance(TransferError),
    #[error("invalid price: {0}")]
    InvalidPrice(&'static str),
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(OracleError),
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("ownership registry: {0}")]
    Ownership(OwnershipError),
}

impl From<TransferError> for EngineError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::InsufficientAllowance { .. } => EngineError::InsufficientAllowance(e),
            _ => EngineError::TransferFailed(e),
        }
    }
}

impl From<OwnershipError> for EngineError {
    fn from(e: OwnershipError) -> Self {
        EngineError::Ownership(e)
    }
}

impl From<OracleError> for EngineError {
    fn from(e: OracleError) -> Self {
        EngineError::OracleUnavailable(e)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
