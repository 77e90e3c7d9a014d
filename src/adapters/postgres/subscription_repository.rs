//! PostgreSQL implementation of SubscriptionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{Subscription, UsagePeriod};
use crate::domain::foundation::{
    CompanyId, DomainError, ErrorCode, SubscriptionId, Timestamp, UsagePeriodId,
};
use crate::ports::SubscriptionRepository;

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    company_id: Uuid,
    plan_id: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            company_id: CompanyId::from_uuid(row.company_id),
            plan: row
                .plan_id
                .parse()
                .map_err(|e| DomainError::database("Invalid plan_id", e))?,
            status: row
                .status
                .parse()
                .map_err(|e| DomainError::database("Invalid subscription status", e))?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UsagePeriodRow {
    id: Uuid,
    subscription_id: Uuid,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    voice_minutes_used: i32,
}

impl TryFrom<UsagePeriodRow> for UsagePeriod {
    type Error = DomainError;

    fn try_from(row: UsagePeriodRow) -> Result<Self, Self::Error> {
        Ok(UsagePeriod {
            id: UsagePeriodId::from_uuid(row.id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            period_start: Timestamp::from_datetime(row.period_start),
            period_end: Timestamp::from_datetime(row.period_end),
            voice_minutes_used: u32::try_from(row.voice_minutes_used)
                .map_err(|e| DomainError::database("Invalid voice_minutes_used", e))?,
        })
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_active(&self, company_id: &CompanyId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, plan_id, status, created_at
            FROM subscriptions
            WHERE company_id = $1 AND status = 'active'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_current_period(
        &self,
        subscription_id: &SubscriptionId,
        at: Timestamp,
    ) -> Result<Option<UsagePeriod>, DomainError> {
        let row: Option<UsagePeriodRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, period_start, period_end, voice_minutes_used
            FROM usage_periods
            WHERE subscription_id = $1 AND period_start <= $2 AND period_end > $2
            ORDER BY period_start DESC
            LIMIT 1
            "#,
        )
        .bind(subscription_id.as_uuid())
        .bind(at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load usage period", e))?;

        row.map(UsagePeriod::try_from).transpose()
    }

    async fn increment_voice_minutes(
        &self,
        period_id: &UsagePeriodId,
        minutes: u32,
    ) -> Result<u32, DomainError> {
        let minutes = i32::try_from(minutes)
            .map_err(|e| DomainError::database("Minutes out of range", e))?;
        let used: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE usage_periods
            SET voice_minutes_used = voice_minutes_used + $2
            WHERE id = $1
            RETURNING voice_minutes_used
            "#,
        )
        .bind(period_id.as_uuid())
        .bind(minutes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to increment voice minutes", e))?;

        let used = used.ok_or_else(|| {
            DomainError::new(ErrorCode::DatabaseError, "Usage period not found")
                .with_detail("period_id", period_id.to_string())
        })?;
        u32::try_from(used).map_err(|e| DomainError::database("Invalid voice_minutes_used", e))
    }
}
