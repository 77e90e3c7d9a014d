//! In-memory call record store.
//!
//! Applies the same merge rules as the PostgreSQL adapter while holding a
//! single write lock, so concurrent upserts for one call are serialized.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::call::{Call, CallStatusUpdate, EndOfCallReport, Priority, Sentiment};
use crate::domain::foundation::{DomainError, ErrorCode, ProviderCallId, Timestamp};
use crate::ports::CallRepository;

/// In-memory implementation of the CallRepository port.
#[derive(Default)]
pub struct InMemoryCallRepository {
    calls: RwLock<HashMap<ProviderCallId, Call>>,
}

impl InMemoryCallRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored calls.
    pub async fn len(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.calls.read().await.is_empty()
    }
}

#[async_trait]
impl CallRepository for InMemoryCallRepository {
    async fn upsert_status(&self, update: &CallStatusUpdate) -> Result<Call, DomainError> {
        let now = Timestamp::now();
        let mut calls = self.calls.write().await;
        let call = calls
            .entry(update.provider_call_id.clone())
            .and_modify(|call| {
                call.apply_status(update, now);
            })
            .or_insert_with(|| Call::from_status(update, now));
        Ok(call.clone())
    }

    async fn upsert_report(&self, report: &EndOfCallReport) -> Result<Call, DomainError> {
        let now = Timestamp::now();
        let mut calls = self.calls.write().await;
        let call = calls
            .entry(report.provider_call_id.clone())
            .and_modify(|call| call.apply_report(report, now))
            .or_insert_with(|| Call::from_report(report, now));
        Ok(call.clone())
    }

    async fn find_by_provider_id(
        &self,
        provider_call_id: &ProviderCallId,
    ) -> Result<Option<Call>, DomainError> {
        Ok(self.calls.read().await.get(provider_call_id).cloned())
    }

    async fn tag(
        &self,
        provider_call_id: &ProviderCallId,
        sentiment: Sentiment,
        priority: Priority,
    ) -> Result<(), DomainError> {
        let mut calls = self.calls.write().await;
        let call = calls.get_mut(provider_call_id).ok_or_else(|| {
            DomainError::new(ErrorCode::CallNotFound, "Call not found")
                .with_detail("provider_call_id", provider_call_id.as_str())
        })?;
        call.tag(sentiment, priority, Timestamp::now());
        Ok(())
    }

    async fn claim_billing(&self, provider_call_id: &ProviderCallId) -> Result<bool, DomainError> {
        let mut calls = self.calls.write().await;
        Ok(calls
            .get_mut(provider_call_id)
            .map(|call| call.claim_billing(Timestamp::now()))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::CallLifecycle;
    use std::sync::Arc;

    fn id(value: &str) -> ProviderCallId {
        ProviderCallId::new(value).unwrap()
    }

    fn status(call: &str, lifecycle: CallLifecycle) -> CallStatusUpdate {
        CallStatusUpdate {
            provider_call_id: id(call),
            lifecycle,
            tenant: None,
            caller_number: None,
            recipient_number: None,
        }
    }

    fn report(call: &str, duration_seconds: u32) -> EndOfCallReport {
        EndOfCallReport {
            provider_call_id: id(call),
            outcome: CallLifecycle::Resolved,
            tenant: None,
            caller_number: None,
            recipient_number: None,
            duration_seconds,
            ended_reason: None,
            transcript: None,
            summary: None,
            recording_url: None,
            cost_breakdown: None,
        }
    }

    #[tokio::test]
    async fn duplicate_status_creates_one_call() {
        let repo = InMemoryCallRepository::new();
        let first = repo
            .upsert_status(&status("c1", CallLifecycle::Ringing))
            .await
            .unwrap();
        let second = repo
            .upsert_status(&status("c1", CallLifecycle::Ringing))
            .await
            .unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn report_before_status_keeps_terminal_state() {
        let repo = InMemoryCallRepository::new();
        repo.upsert_report(&report("c1", 120)).await.unwrap();

        let call = repo
            .upsert_status(&status("c1", CallLifecycle::InProgress))
            .await
            .unwrap();

        assert_eq!(call.lifecycle, CallLifecycle::Resolved);
        assert_eq!(call.duration_seconds, Some(120));
    }

    #[tokio::test]
    async fn status_after_report_fills_missing_tenant() {
        use crate::domain::call::TenantContext;
        use crate::domain::foundation::{AgentId, CompanyId};

        let repo = InMemoryCallRepository::new();
        repo.upsert_report(&report("c1", 600)).await.unwrap();

        let tenant = TenantContext {
            company_id: CompanyId::new(),
            agent_id: AgentId::new(),
        };
        let mut ended = status("c1", CallLifecycle::Failed);
        ended.tenant = Some(tenant);
        let call = repo.upsert_status(&ended).await.unwrap();

        assert_eq!(call.lifecycle, CallLifecycle::Resolved);
        assert_eq!(call.company_id, Some(tenant.company_id));
        assert!(call.awaiting_billing());
    }

    #[tokio::test]
    async fn tag_unknown_call_fails() {
        let repo = InMemoryCallRepository::new();
        let err = repo
            .tag(&id("missing"), Sentiment::Neutral, Priority::Low)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CallNotFound);
    }

    #[tokio::test]
    async fn claim_billing_unknown_call_is_false() {
        let repo = InMemoryCallRepository::new();
        assert!(!repo.claim_billing(&id("missing")).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_claims_have_one_winner() {
        let repo = Arc::new(InMemoryCallRepository::new());
        repo.upsert_report(&report("c1", 60)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.claim_billing(&id("c1")).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
