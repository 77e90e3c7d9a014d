//! PostgreSQL implementation of TenantResolver.
//!
//! Reads the `phone_numbers` and `agents` tables. A number resolves only when
//! it is linked to an active agent.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::call::TenantContext;
use crate::domain::foundation::{AgentId, AssistantId, CompanyId, DomainError, PhoneNumber};
use crate::ports::{TenantAssignment, TenantResolver};

/// PostgreSQL implementation of the TenantResolver port.
pub struct PostgresTenantResolver {
    pool: PgPool,
}

impl PostgresTenantResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    company_id: Uuid,
    agent_id: Uuid,
    config: Value,
}

#[derive(Debug, sqlx::FromRow)]
struct AgentRow {
    company_id: Uuid,
    agent_id: Uuid,
}

#[async_trait]
impl TenantResolver for PostgresTenantResolver {
    async fn resolve_by_phone_number(
        &self,
        number: &PhoneNumber,
    ) -> Result<Option<TenantAssignment>, DomainError> {
        let row: Option<AssignmentRow> = sqlx::query_as(
            r#"
            SELECT pn.company_id, a.id AS agent_id, a.config
            FROM phone_numbers pn
            JOIN agents a ON a.id = pn.agent_id
            WHERE pn.number = $1 AND a.is_active
            "#,
        )
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to resolve phone number", e))?;

        Ok(row.map(|r| TenantAssignment {
            tenant: TenantContext {
                company_id: CompanyId::from_uuid(r.company_id),
                agent_id: AgentId::from_uuid(r.agent_id),
            },
            agent_config: r.config,
        }))
    }

    async fn resolve_by_assistant_id(
        &self,
        assistant_id: &AssistantId,
    ) -> Result<Option<TenantContext>, DomainError> {
        let row: Option<AgentRow> = sqlx::query_as(
            r#"
            SELECT company_id, id AS agent_id
            FROM agents
            WHERE provider_assistant_id = $1
            "#,
        )
        .bind(assistant_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to resolve assistant", e))?;

        Ok(row.map(|r| TenantContext {
            company_id: CompanyId::from_uuid(r.company_id),
            agent_id: AgentId::from_uuid(r.agent_id),
        }))
    }
}
