//! WalletRepository port - atomic balance mutation and the transaction log.
//!
//! Balance changes and transaction rows are two separate writes; callers
//! (the ledger service) always perform both. Implementations must apply the
//! balance change as one storage-level increment so concurrent debits from
//! different calls never lose updates.

use async_trait::async_trait;

use crate::domain::billing::{Wallet, WalletTransaction};
use crate::domain::foundation::{CompanyId, DomainError, WalletId};

/// Port for wallet persistence.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Find the wallet of a tenant.
    async fn find_by_company(&self, company_id: &CompanyId) -> Result<Option<Wallet>, DomainError>;

    /// Find a wallet by ID.
    async fn find(&self, wallet_id: &WalletId) -> Result<Option<Wallet>, DomainError>;

    /// Adds `delta_cents` (negative for debits) to the balance.
    ///
    /// Returns the new balance, or `None` if the wallet does not exist.
    async fn apply_delta(
        &self,
        wallet_id: &WalletId,
        delta_cents: i64,
    ) -> Result<Option<i64>, DomainError>;

    /// Appends an immutable transaction row.
    async fn append_transaction(&self, transaction: &WalletTransaction) -> Result<(), DomainError>;

    /// Lists a wallet's transactions, oldest first.
    async fn transactions(&self, wallet_id: &WalletId) -> Result<Vec<WalletTransaction>, DomainError>;
}
