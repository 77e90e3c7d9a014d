//! Prepaid wallet and its immutable transaction log.
//!
//! # Invariants
//!
//! - All balance changes are a single atomic increment by a signed delta
//! - Every balance change writes exactly one `WalletTransaction`
//! - The sum of a wallet's transactions equals its balance

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::foundation::{CompanyId, Timestamp, ValidationError, WalletId};

/// A tenant's prepaid balance, in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub company_id: CompanyId,
    pub balance_cents: i64,
}

impl Wallet {
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            id: WalletId::new(),
            company_id,
            balance_cents: 0,
        }
    }

    pub fn is_funded(&self) -> bool {
        self.balance_cents > 0
    }
}

/// Why a wallet balance changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Overage charge for a call.
    Usage,
    TopUp,
    Refund,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Usage => "usage",
            TransactionType::TopUp => "topup",
            TransactionType::Refund => "refund",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usage" => Ok(TransactionType::Usage),
            "topup" => Ok(TransactionType::TopUp),
            "refund" => Ok(TransactionType::Refund),
            other => Err(ValidationError::invalid_format(
                "transaction_type",
                format!("unknown transaction type '{}'", other),
            )),
        }
    }
}

/// One immutable ledger line. Debits carry a negative amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub wallet_id: WalletId,
    pub amount_cents: i64,
    pub kind: TransactionType,
    /// Provider call ID for usage charges.
    pub reference_id: Option<String>,
    pub description: String,
    pub created_at: Timestamp,
}

impl WalletTransaction {
    pub fn new(
        wallet_id: WalletId,
        amount_cents: i64,
        kind: TransactionType,
        reference_id: Option<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_id,
            amount_cents,
            kind,
            reference_id,
            description: description.into(),
            created_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wallet_is_empty_and_unfunded() {
        let wallet = Wallet::new(CompanyId::new());
        assert_eq!(wallet.balance_cents, 0);
        assert!(!wallet.is_funded());
    }

    #[test]
    fn negative_balance_is_not_funded() {
        let mut wallet = Wallet::new(CompanyId::new());
        wallet.balance_cents = -5;
        assert!(!wallet.is_funded());
        wallet.balance_cents = 1;
        assert!(wallet.is_funded());
    }

    #[test]
    fn transaction_type_round_trips() {
        for kind in [
            TransactionType::Usage,
            TransactionType::TopUp,
            TransactionType::Refund,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionType>().unwrap(), kind);
        }
    }
}
