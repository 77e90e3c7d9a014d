//! In-memory tenant directory.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::call::TenantContext;
use crate::domain::foundation::{AssistantId, DomainError, PhoneNumber};
use crate::ports::{TenantAssignment, TenantResolver};

/// In-memory implementation of the TenantResolver port.
#[derive(Default)]
pub struct InMemoryTenantDirectory {
    numbers: RwLock<HashMap<PhoneNumber, TenantAssignment>>,
    assistants: RwLock<HashMap<AssistantId, TenantContext>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes calls to `number` to the tenant's agent.
    pub async fn assign_number(&self, number: PhoneNumber, tenant: TenantContext, agent_config: Value) {
        self.numbers.write().await.insert(
            number,
            TenantAssignment {
                tenant,
                agent_config,
            },
        );
    }

    /// Removes the active agent from a number.
    pub async fn unassign_number(&self, number: &PhoneNumber) {
        self.numbers.write().await.remove(number);
    }

    pub async fn register_assistant(&self, assistant_id: AssistantId, tenant: TenantContext) {
        self.assistants.write().await.insert(assistant_id, tenant);
    }
}

#[async_trait]
impl TenantResolver for InMemoryTenantDirectory {
    async fn resolve_by_phone_number(
        &self,
        number: &PhoneNumber,
    ) -> Result<Option<TenantAssignment>, DomainError> {
        Ok(self.numbers.read().await.get(number).cloned())
    }

    async fn resolve_by_assistant_id(
        &self,
        assistant_id: &AssistantId,
    ) -> Result<Option<TenantContext>, DomainError> {
        Ok(self.assistants.read().await.get(assistant_id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AgentId, CompanyId};
    use serde_json::json;

    fn tenant() -> TenantContext {
        TenantContext {
            company_id: CompanyId::new(),
            agent_id: AgentId::new(),
        }
    }

    #[tokio::test]
    async fn assigned_number_resolves() {
        let directory = InMemoryTenantDirectory::new();
        let number = PhoneNumber::new("+15550001").unwrap();
        let tenant = tenant();
        directory
            .assign_number(number.clone(), tenant, json!({"name": "Front desk"}))
            .await;

        let found = directory.resolve_by_phone_number(&number).await.unwrap().unwrap();
        assert_eq!(found.tenant, tenant);
        assert_eq!(found.agent_config["name"], "Front desk");
    }

    #[tokio::test]
    async fn unassigned_number_is_none() {
        let directory = InMemoryTenantDirectory::new();
        let number = PhoneNumber::new("+15550001").unwrap();
        directory.assign_number(number.clone(), tenant(), json!({})).await;
        directory.unassign_number(&number).await;

        assert!(directory.resolve_by_phone_number(&number).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn assistant_resolves_to_tenant() {
        let directory = InMemoryTenantDirectory::new();
        let assistant = AssistantId::new("asst_1").unwrap();
        let tenant = tenant();
        directory.register_assistant(assistant.clone(), tenant).await;

        assert_eq!(
            directory.resolve_by_assistant_id(&assistant).await.unwrap(),
            Some(tenant)
        );
    }
}
