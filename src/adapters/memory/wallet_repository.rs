//! In-memory wallets and transaction log.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::billing::{Wallet, WalletTransaction};
use crate::domain::foundation::{CompanyId, DomainError, WalletId};
use crate::ports::WalletRepository;

/// In-memory implementation of the WalletRepository port.
#[derive(Default)]
pub struct InMemoryWalletRepository {
    wallets: RwLock<HashMap<WalletId, Wallet>>,
    transactions: RwLock<Vec<WalletTransaction>>,
}

impl InMemoryWalletRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_wallet(&self, wallet: Wallet) {
        self.wallets.write().await.insert(wallet.id, wallet);
    }
}

#[async_trait]
impl WalletRepository for InMemoryWalletRepository {
    async fn find_by_company(&self, company_id: &CompanyId) -> Result<Option<Wallet>, DomainError> {
        Ok(self
            .wallets
            .read()
            .await
            .values()
            .find(|w| &w.company_id == company_id)
            .cloned())
    }

    async fn find(&self, wallet_id: &WalletId) -> Result<Option<Wallet>, DomainError> {
        Ok(self.wallets.read().await.get(wallet_id).cloned())
    }

    async fn apply_delta(
        &self,
        wallet_id: &WalletId,
        delta_cents: i64,
    ) -> Result<Option<i64>, DomainError> {
        let mut wallets = self.wallets.write().await;
        Ok(wallets.get_mut(wallet_id).map(|wallet| {
            wallet.balance_cents += delta_cents;
            wallet.balance_cents
        }))
    }

    async fn append_transaction(&self, transaction: &WalletTransaction) -> Result<(), DomainError> {
        self.transactions.write().await.push(transaction.clone());
        Ok(())
    }

    async fn transactions(&self, wallet_id: &WalletId) -> Result<Vec<WalletTransaction>, DomainError> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .filter(|t| &t.wallet_id == wallet_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::TransactionType;
    use std::sync::Arc;

    #[tokio::test]
    async fn apply_delta_on_unknown_wallet_is_none() {
        let repo = InMemoryWalletRepository::new();
        assert_eq!(repo.apply_delta(&WalletId::new(), -10).await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_deltas_are_not_lost() {
        let repo = Arc::new(InMemoryWalletRepository::new());
        let wallet = Wallet::new(CompanyId::new());
        let wallet_id = wallet.id;
        repo.insert_wallet(wallet).await;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.apply_delta(&wallet_id, -7).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let wallet = repo.find(&wallet_id).await.unwrap().unwrap();
        assert_eq!(wallet.balance_cents, -350);
    }

    #[tokio::test]
    async fn transactions_are_filtered_by_wallet() {
        let repo = InMemoryWalletRepository::new();
        let a = WalletId::new();
        let b = WalletId::new();
        repo.append_transaction(&WalletTransaction::new(a, 100, TransactionType::TopUp, None, "a"))
            .await
            .unwrap();
        repo.append_transaction(&WalletTransaction::new(b, 50, TransactionType::TopUp, None, "b"))
            .await
            .unwrap();

        let listed = repo.transactions(&a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].amount_cents, 100);
    }
}
