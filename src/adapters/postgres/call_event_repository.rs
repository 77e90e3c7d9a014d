//! PostgreSQL implementation of CallEventRepository.
//!
//! The event payload is stored as JSONB in its tagged serde form; `kind` is
//! duplicated into its own column for filtering.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::call::CallEvent;
use crate::domain::foundation::{CallId, DomainError, Timestamp};
use crate::ports::CallEventRepository;

/// PostgreSQL implementation of the CallEventRepository port.
pub struct PostgresCallEventRepository {
    pool: PgPool,
}

impl PostgresCallEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CallEventRow {
    call_id: Uuid,
    payload: Value,
    recorded_at: DateTime<Utc>,
}

#[async_trait]
impl CallEventRepository for PostgresCallEventRepository {
    async fn append(&self, event: &CallEvent) -> Result<(), DomainError> {
        let payload = serde_json::to_value(&event.kind)
            .map_err(|e| DomainError::database("Failed to encode call event", e))?;

        sqlx::query(
            r#"
            INSERT INTO call_events (call_id, kind, payload, recorded_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(event.call_id.as_uuid())
        .bind(event.kind.as_str())
        .bind(payload)
        .bind(event.recorded_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to append call event", e))?;

        Ok(())
    }

    async fn list_for_call(&self, call_id: &CallId) -> Result<Vec<CallEvent>, DomainError> {
        let rows: Vec<CallEventRow> = sqlx::query_as(
            r#"
            SELECT call_id, payload, recorded_at
            FROM call_events
            WHERE call_id = $1
            ORDER BY id
            "#,
        )
        .bind(call_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list call events", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(CallEvent {
                    call_id: CallId::from_uuid(row.call_id),
                    kind: serde_json::from_value(row.payload)
                        .map_err(|e| DomainError::database("Invalid call event payload", e))?,
                    recorded_at: Timestamp::from_datetime(row.recorded_at),
                })
            })
            .collect()
    }
}
