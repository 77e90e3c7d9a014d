//! PostgreSQL implementation of UsageLogRepository.
//!
//! The `usage_logs_reference_key` unique constraint makes the insert
//! idempotent; a conflicting insert reports `AlreadyExists`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{ResourceType, UsageLog};
use crate::domain::foundation::{CompanyId, DomainError, Timestamp};
use crate::ports::{SaveResult, UsageLogRepository};

/// PostgreSQL implementation of the UsageLogRepository port.
pub struct PostgresUsageLogRepository {
    pool: PgPool,
}

impl PostgresUsageLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UsageLogRow {
    id: Uuid,
    company_id: Uuid,
    reference_id: String,
    quantity: i32,
    cost_cents: i64,
    metadata: Value,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UsageLogRepository for PostgresUsageLogRepository {
    async fn save(&self, log: &UsageLog) -> Result<SaveResult, DomainError> {
        let quantity = i32::try_from(log.quantity)
            .map_err(|e| DomainError::database("Usage quantity out of range", e))?;
        let result = sqlx::query(
            r#"
            INSERT INTO usage_logs (
                id, company_id, resource_type, reference_id, quantity, cost_cents, metadata,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (reference_id, resource_type) DO NOTHING
            "#,
        )
        .bind(log.id)
        .bind(log.company_id.as_uuid())
        .bind(log.resource_type.as_str())
        .bind(&log.reference_id)
        .bind(quantity)
        .bind(log.cost_cents)
        .bind(&log.metadata)
        .bind(log.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to save usage log", e))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn find_by_reference(
        &self,
        reference_id: &str,
        resource_type: ResourceType,
    ) -> Result<Option<UsageLog>, DomainError> {
        let row: Option<UsageLogRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, reference_id, quantity, cost_cents, metadata, created_at
            FROM usage_logs
            WHERE reference_id = $1 AND resource_type = $2
            "#,
        )
        .bind(reference_id)
        .bind(resource_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load usage log", e))?;

        row.map(|r| {
            Ok(UsageLog {
                id: r.id,
                company_id: CompanyId::from_uuid(r.company_id),
                resource_type,
                reference_id: r.reference_id,
                quantity: u32::try_from(r.quantity)
                    .map_err(|e| DomainError::database("Invalid usage quantity", e))?,
                cost_cents: r.cost_cents,
                metadata: r.metadata,
                created_at: Timestamp::from_datetime(r.created_at),
            })
        })
        .transpose()
    }
}
