//! WalletLedgerService - balance mutation with an immutable transaction log.
//!
//! Every balance change is one atomic increment by a signed delta followed by
//! exactly one transaction row. The two writes are not in one database
//! transaction; the increment is the source of truth for the balance and the
//! row records why it changed.

use std::sync::Arc;

use crate::domain::billing::{BillingError, TransactionType, WalletTransaction};
use crate::domain::foundation::{CompanyId, WalletId};
use crate::ports::WalletRepository;

/// A completed ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub transaction: WalletTransaction,
    pub balance_after_cents: i64,
}

/// Outcome of comparing a wallet balance against its transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub wallet_id: WalletId,
    pub balance_cents: i64,
    pub ledger_sum_cents: i64,
}

impl Reconciliation {
    /// Balance minus the sum of transactions; zero when consistent.
    pub fn drift_cents(&self) -> i64 {
        self.balance_cents - self.ledger_sum_cents
    }

    pub fn is_balanced(&self) -> bool {
        self.drift_cents() == 0
    }
}

/// Service owning all wallet balance changes.
pub struct WalletLedgerService {
    wallets: Arc<dyn WalletRepository>,
}

impl WalletLedgerService {
    pub fn new(wallets: Arc<dyn WalletRepository>) -> Self {
        Self { wallets }
    }

    /// Debits a wallet by `amount_cents` and records a usage transaction.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` - amount is not positive
    /// - `UnknownWallet` - wallet does not exist
    pub async fn debit(
        &self,
        wallet_id: WalletId,
        amount_cents: i64,
        reference_id: Option<String>,
        description: impl Into<String>,
    ) -> Result<LedgerEntry, BillingError> {
        if amount_cents <= 0 {
            return Err(BillingError::InvalidAmount(amount_cents));
        }
        self.apply(
            wallet_id,
            -amount_cents,
            TransactionType::Usage,
            reference_id,
            description.into(),
        )
        .await
    }

    /// Debits the wallet of a tenant.
    ///
    /// # Errors
    ///
    /// - `WalletNotFound` - the tenant has no wallet
    pub async fn debit_company(
        &self,
        company_id: CompanyId,
        amount_cents: i64,
        reference_id: Option<String>,
        description: impl Into<String>,
    ) -> Result<LedgerEntry, BillingError> {
        let wallet = self
            .wallets
            .find_by_company(&company_id)
            .await?
            .ok_or(BillingError::WalletNotFound(company_id))?;
        self.debit(wallet.id, amount_cents, reference_id, description)
            .await
    }

    /// Credits a wallet (top-up or refund).
    pub async fn credit(
        &self,
        wallet_id: WalletId,
        amount_cents: i64,
        kind: TransactionType,
        reference_id: Option<String>,
        description: impl Into<String>,
    ) -> Result<LedgerEntry, BillingError> {
        if amount_cents <= 0 || kind == TransactionType::Usage {
            return Err(BillingError::InvalidAmount(amount_cents));
        }
        self.apply(wallet_id, amount_cents, kind, reference_id, description.into())
            .await
    }

    /// Compares the stored balance with the sum of transactions.
    pub async fn reconcile(&self, wallet_id: WalletId) -> Result<Reconciliation, BillingError> {
        let wallet = self
            .wallets
            .find(&wallet_id)
            .await?
            .ok_or(BillingError::UnknownWallet(wallet_id))?;
        let ledger_sum_cents = self
            .wallets
            .transactions(&wallet_id)
            .await?
            .iter()
            .map(|t| t.amount_cents)
            .sum();

        let reconciliation = Reconciliation {
            wallet_id,
            balance_cents: wallet.balance_cents,
            ledger_sum_cents,
        };
        if !reconciliation.is_balanced() {
            tracing::warn!(
                wallet_id = %wallet_id,
                drift_cents = reconciliation.drift_cents(),
                "Wallet balance does not match transaction log"
            );
        }
        Ok(reconciliation)
    }

    async fn apply(
        &self,
        wallet_id: WalletId,
        delta_cents: i64,
        kind: TransactionType,
        reference_id: Option<String>,
        description: String,
    ) -> Result<LedgerEntry, BillingError> {
        // 1. Atomic balance change
        let balance_after_cents = self
            .wallets
            .apply_delta(&wallet_id, delta_cents)
            .await?
            .ok_or(BillingError::UnknownWallet(wallet_id))?;

        // 2. Exactly one transaction row
        let transaction =
            WalletTransaction::new(wallet_id, delta_cents, kind, reference_id, description);
        self.wallets.append_transaction(&transaction).await?;

        tracing::info!(
            wallet_id = %wallet_id,
            delta_cents,
            balance_after_cents,
            kind = kind.as_str(),
            "Wallet balance changed"
        );

        Ok(LedgerEntry {
            transaction,
            balance_after_cents,
        })
    }
}
