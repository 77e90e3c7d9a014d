//! PostgreSQL implementation of WalletRepository.
//!
//! Balance changes are a single `balance_cents = balance_cents + $delta`
//! statement; the database serializes concurrent debits on the row lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{Wallet, WalletTransaction};
use crate::domain::foundation::{CompanyId, DomainError, Timestamp, WalletId};
use crate::ports::WalletRepository;

/// PostgreSQL implementation of the WalletRepository port.
pub struct PostgresWalletRepository {
    pool: PgPool,
}

impl PostgresWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WalletRow {
    id: Uuid,
    company_id: Uuid,
    balance_cents: i64,
}

impl From<WalletRow> for Wallet {
    fn from(row: WalletRow) -> Self {
        Wallet {
            id: WalletId::from_uuid(row.id),
            company_id: CompanyId::from_uuid(row.company_id),
            balance_cents: row.balance_cents,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    wallet_id: Uuid,
    amount_cents: i64,
    #[sqlx(rename = "type")]
    kind: String,
    reference_id: Option<String>,
    description: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for WalletTransaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(WalletTransaction {
            id: row.id,
            wallet_id: WalletId::from_uuid(row.wallet_id),
            amount_cents: row.amount_cents,
            kind: row
                .kind
                .parse()
                .map_err(|e| DomainError::database("Invalid transaction type", e))?,
            reference_id: row.reference_id,
            description: row.description,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl WalletRepository for PostgresWalletRepository {
    async fn find_by_company(&self, company_id: &CompanyId) -> Result<Option<Wallet>, DomainError> {
        let row: Option<WalletRow> = sqlx::query_as(
            "SELECT id, company_id, balance_cents FROM wallets WHERE company_id = $1",
        )
        .bind(company_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load wallet", e))?;

        Ok(row.map(Wallet::from))
    }

    async fn find(&self, wallet_id: &WalletId) -> Result<Option<Wallet>, DomainError> {
        let row: Option<WalletRow> =
            sqlx::query_as("SELECT id, company_id, balance_cents FROM wallets WHERE id = $1")
                .bind(wallet_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database("Failed to load wallet", e))?;

        Ok(row.map(Wallet::from))
    }

    async fn apply_delta(
        &self,
        wallet_id: &WalletId,
        delta_cents: i64,
    ) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar(
            r#"
            UPDATE wallets
            SET balance_cents = balance_cents + $2, updated_at = now()
            WHERE id = $1
            RETURNING balance_cents
            "#,
        )
        .bind(wallet_id.as_uuid())
        .bind(delta_cents)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update wallet balance", e))
    }

    async fn append_transaction(&self, transaction: &WalletTransaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (
                id, wallet_id, amount_cents, type, reference_id, description, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.wallet_id.as_uuid())
        .bind(transaction.amount_cents)
        .bind(transaction.kind.as_str())
        .bind(&transaction.reference_id)
        .bind(&transaction.description)
        .bind(transaction.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to record wallet transaction", e))?;

        Ok(())
    }

    async fn transactions(&self, wallet_id: &WalletId) -> Result<Vec<WalletTransaction>, DomainError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, wallet_id, amount_cents, type, reference_id, description, created_at
            FROM wallet_transactions
            WHERE wallet_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(wallet_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list wallet transactions", e))?;

        rows.into_iter().map(WalletTransaction::try_from).collect()
    }
}
