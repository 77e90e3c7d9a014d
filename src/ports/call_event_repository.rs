//! CallEventRepository port - append-only transcript and function-call log.

use async_trait::async_trait;

use crate::domain::call::CallEvent;
use crate::domain::foundation::{CallId, DomainError};

/// Port for the call event log. Events are never updated or deleted.
#[async_trait]
pub trait CallEventRepository: Send + Sync {
    async fn append(&self, event: &CallEvent) -> Result<(), DomainError>;

    /// Lists a call's events in recording order.
    async fn list_for_call(&self, call_id: &CallId) -> Result<Vec<CallEvent>, DomainError>;
}
