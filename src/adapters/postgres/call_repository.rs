//! PostgreSQL implementation of CallRepository.
//!
//! Every write is a single `INSERT ... ON CONFLICT (provider_call_id)`
//! statement, so concurrent deliveries for the same call are serialized by
//! the unique index. The lifecycle merge is done in SQL with
//! `call_lifecycle_rank()`: a terminal state is never replaced and a lower
//! rank never overwrites a higher one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::call::{Call, CallLifecycle, CallStatusUpdate, EndOfCallReport, Priority, Sentiment};
use crate::domain::foundation::{
    AgentId, CallId, CompanyId, DomainError, ErrorCode, PhoneNumber, ProviderCallId, Timestamp,
};
use crate::ports::CallRepository;

const CALL_COLUMNS: &str = r#"
    id, provider_call_id, company_id, agent_id, caller_number, recipient_number,
    lifecycle_state, duration_seconds, ended_reason, transcript, summary, recording_url,
    sentiment, priority, cost_breakdown, billed_at, created_at, updated_at
"#;

/// PostgreSQL implementation of the CallRepository port.
pub struct PostgresCallRepository {
    pool: PgPool,
}

impl PostgresCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, provider_call_id: &ProviderCallId) -> Result<Option<Call>, DomainError> {
        let sql = format!("SELECT {} FROM calls WHERE provider_call_id = $1", CALL_COLUMNS);
        let row: Option<CallRow> = sqlx::query_as(&sql)
            .bind(provider_call_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to load call", e))?;
        row.map(Call::try_from).transpose()
    }
}

/// Database row representation of a call.
#[derive(Debug, sqlx::FromRow)]
struct CallRow {
    id: Uuid,
    provider_call_id: String,
    company_id: Option<Uuid>,
    agent_id: Option<Uuid>,
    caller_number: Option<String>,
    recipient_number: Option<String>,
    lifecycle_state: String,
    duration_seconds: Option<i32>,
    ended_reason: Option<String>,
    transcript: Option<String>,
    summary: Option<String>,
    recording_url: Option<String>,
    sentiment: Option<String>,
    priority: Option<String>,
    cost_breakdown: Option<Value>,
    billed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CallRow> for Call {
    type Error = DomainError;

    fn try_from(row: CallRow) -> Result<Self, Self::Error> {
        let lifecycle: CallLifecycle = row
            .lifecycle_state
            .parse()
            .map_err(|e| DomainError::database("Invalid lifecycle_state", e))?;
        let sentiment = row
            .sentiment
            .map(|s| s.parse::<Sentiment>())
            .transpose()
            .map_err(|e| DomainError::database("Invalid sentiment", e))?;
        let priority = row
            .priority
            .map(|p| p.parse::<Priority>())
            .transpose()
            .map_err(|e| DomainError::database("Invalid priority", e))?;
        let duration_seconds = row
            .duration_seconds
            .map(u32::try_from)
            .transpose()
            .map_err(|e| DomainError::database("Invalid duration_seconds", e))?;

        Ok(Call {
            id: CallId::from_uuid(row.id),
            provider_call_id: ProviderCallId::new(row.provider_call_id)
                .map_err(|e| DomainError::database("Invalid provider_call_id", e))?,
            company_id: row.company_id.map(CompanyId::from_uuid),
            agent_id: row.agent_id.map(AgentId::from_uuid),
            caller_number: parse_number(row.caller_number),
            recipient_number: parse_number(row.recipient_number),
            lifecycle,
            duration_seconds,
            ended_reason: row.ended_reason,
            transcript: row.transcript,
            summary: row.summary,
            recording_url: row.recording_url,
            sentiment,
            priority,
            cost_breakdown: row.cost_breakdown,
            billed_at: row.billed_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_number(raw: Option<String>) -> Option<PhoneNumber> {
    raw.and_then(|n| PhoneNumber::new(n).ok())
}

fn duration_to_db(seconds: u32) -> i32 {
    i32::try_from(seconds).unwrap_or(i32::MAX)
}

#[async_trait]
impl CallRepository for PostgresCallRepository {
    async fn upsert_status(&self, update: &CallStatusUpdate) -> Result<Call, DomainError> {
        let now = Timestamp::now();
        let sql = format!(
            r#"
            INSERT INTO calls (
                id, provider_call_id, company_id, agent_id, caller_number, recipient_number,
                lifecycle_state, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ON CONFLICT (provider_call_id) DO UPDATE SET
                lifecycle_state = CASE
                    WHEN call_lifecycle_rank(EXCLUDED.lifecycle_state)
                         > call_lifecycle_rank(calls.lifecycle_state)
                    THEN EXCLUDED.lifecycle_state
                    ELSE calls.lifecycle_state
                END,
                company_id = COALESCE(calls.company_id, EXCLUDED.company_id),
                agent_id = COALESCE(calls.agent_id, EXCLUDED.agent_id),
                caller_number = COALESCE(calls.caller_number, EXCLUDED.caller_number),
                recipient_number = COALESCE(calls.recipient_number, EXCLUDED.recipient_number),
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            CALL_COLUMNS
        );

        // Terminal rows keep their state but still take missing attribution.
        let row: CallRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(update.provider_call_id.as_str())
            .bind(update.tenant.map(|t| *t.company_id.as_uuid()))
            .bind(update.tenant.map(|t| *t.agent_id.as_uuid()))
            .bind(update.caller_number.as_ref().map(|n| n.as_str()))
            .bind(update.recipient_number.as_ref().map(|n| n.as_str()))
            .bind(update.lifecycle.as_str())
            .bind(now.as_datetime())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to upsert call status", e))?;

        Call::try_from(row)
    }

    async fn upsert_report(&self, report: &EndOfCallReport) -> Result<Call, DomainError> {
        let now = Timestamp::now();
        let sql = format!(
            r#"
            INSERT INTO calls (
                id, provider_call_id, company_id, agent_id, caller_number, recipient_number,
                lifecycle_state, duration_seconds, ended_reason, transcript, summary,
                recording_url, cost_breakdown, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            ON CONFLICT (provider_call_id) DO UPDATE SET
                lifecycle_state = CASE
                    WHEN call_lifecycle_rank(calls.lifecycle_state) = 3
                    THEN calls.lifecycle_state
                    WHEN call_lifecycle_rank(EXCLUDED.lifecycle_state)
                         > call_lifecycle_rank(calls.lifecycle_state)
                    THEN EXCLUDED.lifecycle_state
                    ELSE calls.lifecycle_state
                END,
                company_id = COALESCE(calls.company_id, EXCLUDED.company_id),
                agent_id = COALESCE(calls.agent_id, EXCLUDED.agent_id),
                caller_number = COALESCE(calls.caller_number, EXCLUDED.caller_number),
                recipient_number = COALESCE(calls.recipient_number, EXCLUDED.recipient_number),
                duration_seconds = EXCLUDED.duration_seconds,
                ended_reason = EXCLUDED.ended_reason,
                transcript = EXCLUDED.transcript,
                summary = EXCLUDED.summary,
                recording_url = EXCLUDED.recording_url,
                cost_breakdown = EXCLUDED.cost_breakdown,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            CALL_COLUMNS
        );

        let row: CallRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(report.provider_call_id.as_str())
            .bind(report.tenant.map(|t| *t.company_id.as_uuid()))
            .bind(report.tenant.map(|t| *t.agent_id.as_uuid()))
            .bind(report.caller_number.as_ref().map(|n| n.as_str()))
            .bind(report.recipient_number.as_ref().map(|n| n.as_str()))
            .bind(report.outcome.as_str())
            .bind(duration_to_db(report.duration_seconds))
            .bind(&report.ended_reason)
            .bind(&report.transcript)
            .bind(&report.summary)
            .bind(&report.recording_url)
            .bind(&report.cost_breakdown)
            .bind(now.as_datetime())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to upsert end-of-call report", e))?;

        Call::try_from(row)
    }

    async fn find_by_provider_id(
        &self,
        provider_call_id: &ProviderCallId,
    ) -> Result<Option<Call>, DomainError> {
        self.fetch(provider_call_id).await
    }

    async fn tag(
        &self,
        provider_call_id: &ProviderCallId,
        sentiment: Sentiment,
        priority: Priority,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE calls SET sentiment = $2, priority = $3, updated_at = $4
            WHERE provider_call_id = $1
            "#,
        )
        .bind(provider_call_id.as_str())
        .bind(sentiment.as_str())
        .bind(priority.as_str())
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to tag call", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::CallNotFound, "Call not found")
                .with_detail("provider_call_id", provider_call_id.as_str()));
        }
        Ok(())
    }

    async fn claim_billing(&self, provider_call_id: &ProviderCallId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE calls SET billed_at = $2
            WHERE provider_call_id = $1 AND billed_at IS NULL
            "#,
        )
        .bind(provider_call_id.as_str())
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to claim call for billing", e))?;

        Ok(result.rows_affected() == 1)
    }
}
