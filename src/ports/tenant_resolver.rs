//! TenantResolver port - maps provider identifiers to tenants and agents.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::call::TenantContext;
use crate::domain::foundation::{AssistantId, DomainError, PhoneNumber};

/// A phone number's owner and the agent configured to answer it.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantAssignment {
    pub tenant: TenantContext,
    /// Provider-facing assistant configuration, returned verbatim.
    pub agent_config: Value,
}

/// Port for tenant lookups.
///
/// Lookups return `None` rather than an error when nothing is assigned, so
/// callers can answer the provider with a normal "not configured" response.
#[async_trait]
pub trait TenantResolver: Send + Sync {
    /// Resolves the tenant and active agent for a dialed number.
    ///
    /// Returns `None` if the number is unknown or has no active agent.
    async fn resolve_by_phone_number(
        &self,
        number: &PhoneNumber,
    ) -> Result<Option<TenantAssignment>, DomainError>;

    /// Resolves the tenant owning a provider assistant.
    async fn resolve_by_assistant_id(
        &self,
        assistant_id: &AssistantId,
    ) -> Result<Option<TenantContext>, DomainError>;
}
