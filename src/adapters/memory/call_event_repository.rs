//! In-memory call event log.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::call::CallEvent;
use crate::domain::foundation::{CallId, DomainError};
use crate::ports::CallEventRepository;

/// In-memory implementation of the CallEventRepository port.
#[derive(Default)]
pub struct InMemoryCallEventRepository {
    events: RwLock<Vec<CallEvent>>,
}

impl InMemoryCallEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events across all calls.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl CallEventRepository for InMemoryCallEventRepository {
    async fn append(&self, event: &CallEvent) -> Result<(), DomainError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn list_for_call(&self, call_id: &CallId) -> Result<Vec<CallEvent>, DomainError> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| &e.call_id == call_id)
            .cloned()
            .collect())
    }
}
