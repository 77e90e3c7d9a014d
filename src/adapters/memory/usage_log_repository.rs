//! In-memory usage log store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::billing::{ResourceType, UsageLog};
use crate::domain::foundation::DomainError;
use crate::ports::{SaveResult, UsageLogRepository};

/// In-memory implementation of the UsageLogRepository port.
#[derive(Default)]
pub struct InMemoryUsageLogRepository {
    logs: RwLock<HashMap<(String, ResourceType), UsageLog>>,
}

impl InMemoryUsageLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.logs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.logs.read().await.is_empty()
    }
}

#[async_trait]
impl UsageLogRepository for InMemoryUsageLogRepository {
    async fn save(&self, log: &UsageLog) -> Result<SaveResult, DomainError> {
        let mut logs = self.logs.write().await;
        let key = (log.reference_id.clone(), log.resource_type);
        if logs.contains_key(&key) {
            return Ok(SaveResult::AlreadyExists);
        }
        logs.insert(key, log.clone());
        Ok(SaveResult::Inserted)
    }

    async fn find_by_reference(
        &self,
        reference_id: &str,
        resource_type: ResourceType,
    ) -> Result<Option<UsageLog>, DomainError> {
        Ok(self
            .logs
            .read()
            .await
            .get(&(reference_id.to_string(), resource_type))
            .cloned())
    }
}
