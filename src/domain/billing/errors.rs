//! Billing error types.

use thiserror::Error;

use crate::domain::foundation::{CompanyId, DomainError, ErrorCode, WalletId};

/// Errors raised while metering a call or mutating a wallet.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Overage is owed but the tenant has no wallet.
    #[error("No wallet for company {0}")]
    WalletNotFound(CompanyId),

    /// Wallet ID does not exist.
    #[error("Wallet {0} not found")]
    UnknownWallet(WalletId),

    /// Amount passed to a ledger operation is not positive.
    #[error("Invalid amount: {0} cents")]
    InvalidAmount(i64),

    /// Storage failure.
    #[error("{0}")]
    Repository(#[from] DomainError),
}

impl BillingError {
    /// Returns true if the failure needs an operator, not a retry.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            BillingError::WalletNotFound(_) | BillingError::UnknownWallet(_)
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::WalletNotFound(_) | BillingError::UnknownWallet(_) => {
                ErrorCode::WalletNotFound
            }
            BillingError::InvalidAmount(_) => ErrorCode::OutOfRange,
            BillingError::Repository(err) => err.code,
        }
    }
}
