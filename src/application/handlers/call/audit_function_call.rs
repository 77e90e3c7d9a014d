//! AuditFunctionCallHandler - logs tool invocations made by an agent mid-call.
//!
//! The tenant is taken from the assistant that issued the call; the entry is
//! only written when both the tenant and the call record are known.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::call::CallEvent;
use crate::domain::foundation::{AssistantId, CallId, DomainError, ProviderCallId};
use crate::ports::{CallEventRepository, CallRepository, TenantResolver};

/// Command to audit a function call.
#[derive(Debug, Clone)]
pub struct AuditFunctionCallCommand {
    pub provider_call_id: ProviderCallId,
    pub assistant_id: Option<AssistantId>,
    pub name: String,
    pub parameters: Value,
}

/// Result of auditing a function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditFunctionCallResult {
    Recorded { call_id: CallId },
    /// Assistant is not registered to any tenant.
    UnknownTenant,
    UnknownCall,
}

/// Handler for function-call audit entries.
pub struct AuditFunctionCallHandler {
    tenants: Arc<dyn TenantResolver>,
    calls: Arc<dyn CallRepository>,
    events: Arc<dyn CallEventRepository>,
}

impl AuditFunctionCallHandler {
    pub fn new(
        tenants: Arc<dyn TenantResolver>,
        calls: Arc<dyn CallRepository>,
        events: Arc<dyn CallEventRepository>,
    ) -> Self {
        Self {
            tenants,
            calls,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: AuditFunctionCallCommand,
    ) -> Result<AuditFunctionCallResult, DomainError> {
        // 1. Tenant from the assistant
        let tenant = match &cmd.assistant_id {
            Some(assistant_id) => self.tenants.resolve_by_assistant_id(assistant_id).await?,
            None => None,
        };
        let Some(tenant) = tenant else {
            tracing::warn!(
                provider_call_id = %cmd.provider_call_id,
                function = %cmd.name,
                "Function call from unregistered assistant, not audited"
            );
            return Ok(AuditFunctionCallResult::UnknownTenant);
        };

        // 2. Call record
        let Some(call) = self.calls.find_by_provider_id(&cmd.provider_call_id).await? else {
            tracing::warn!(
                provider_call_id = %cmd.provider_call_id,
                function = %cmd.name,
                "Function call for unknown call, not audited"
            );
            return Ok(AuditFunctionCallResult::UnknownCall);
        };

        // 3. Append
        tracing::info!(
            provider_call_id = %cmd.provider_call_id,
            company_id = %tenant.company_id,
            function = %cmd.name,
            "Function call audited"
        );
        self.events
            .append(&CallEvent::function_call(
                call.id,
                tenant.company_id,
                cmd.name,
                cmd.parameters,
            ))
            .await?;

        Ok(AuditFunctionCallResult::Recorded { call_id: call.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryCallEventRepository, InMemoryCallRepository, InMemoryTenantDirectory,
    };
    use crate::domain::call::{CallEventKind, CallLifecycle, CallStatusUpdate, TenantContext};
    use crate::domain::foundation::{AgentId, CompanyId};
    use serde_json::json;

    struct Fixture {
        handler: AuditFunctionCallHandler,
        tenants: Arc<InMemoryTenantDirectory>,
        calls: Arc<InMemoryCallRepository>,
        events: Arc<InMemoryCallEventRepository>,
    }

    fn fixture() -> Fixture {
        let tenants = Arc::new(InMemoryTenantDirectory::new());
        let calls = Arc::new(InMemoryCallRepository::new());
        let events = Arc::new(InMemoryCallEventRepository::new());
        Fixture {
            handler: AuditFunctionCallHandler::new(tenants.clone(), calls.clone(), events.clone()),
            tenants,
            calls,
            events,
        }
    }

    fn command() -> AuditFunctionCallCommand {
        AuditFunctionCallCommand {
            provider_call_id: ProviderCallId::new("call-1").unwrap(),
            assistant_id: Some(AssistantId::new("asst-1").unwrap()),
            name: "bookAppointment".to_string(),
            parameters: json!({"date": "2026-11-02"}),
        }
    }

    async fn start_call(calls: &InMemoryCallRepository) -> CallId {
        calls
            .upsert_status(&CallStatusUpdate {
                provider_call_id: ProviderCallId::new("call-1").unwrap(),
                lifecycle: CallLifecycle::InProgress,
                tenant: None,
                caller_number: None,
                recipient_number: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn known_assistant_and_call_are_audited() {
        let fx = fixture();
        let company_id = CompanyId::new();
        fx.tenants
            .register_assistant(
                AssistantId::new("asst-1").unwrap(),
                TenantContext {
                    company_id,
                    agent_id: AgentId::new(),
                },
            )
            .await;
        let call_id = start_call(&fx.calls).await;

        let result = fx.handler.handle(command()).await.unwrap();

        assert_eq!(result, AuditFunctionCallResult::Recorded { call_id });
        let events = fx.events.list_for_call(&call_id).await.unwrap();
        assert_eq!(
            events[0].kind,
            CallEventKind::FunctionCall {
                company_id,
                name: "bookAppointment".to_string(),
                parameters: json!({"date": "2026-11-02"}),
            }
        );
    }

    #[tokio::test]
    async fn unregistered_assistant_is_not_audited() {
        let fx = fixture();
        start_call(&fx.calls).await;

        let result = fx.handler.handle(command()).await.unwrap();

        assert_eq!(result, AuditFunctionCallResult::UnknownTenant);
        assert!(fx.events.is_empty().await);
    }

    #[tokio::test]
    async fn missing_call_is_not_audited() {
        let fx = fixture();
        fx.tenants
            .register_assistant(
                AssistantId::new("asst-1").unwrap(),
                TenantContext {
                    company_id: CompanyId::new(),
                    agent_id: AgentId::new(),
                },
            )
            .await;

        let result = fx.handler.handle(command()).await.unwrap();

        assert_eq!(result, AuditFunctionCallResult::UnknownCall);
        assert!(fx.events.is_empty().await);
    }
}
