//! CallRepository port - idempotent storage of call records.
//!
//! Calls are keyed by the provider call ID. Webhook deliveries can arrive out
//! of order, be duplicated, or be retried, so every write is an upsert on that
//! key and implementations must apply the lifecycle merge rule atomically:
//! terminal states are never changed and older states never overwrite newer
//! ones.

use async_trait::async_trait;

use crate::domain::call::{Call, CallStatusUpdate, EndOfCallReport, Priority, Sentiment};
use crate::domain::foundation::{DomainError, ProviderCallId};

/// Port for call record persistence.
#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Inserts the call if absent, otherwise merges the status into it.
    ///
    /// Metadata (tenant, agent, numbers) is only filled in while the call is
    /// not terminal. Returns the stored call after the write.
    async fn upsert_status(&self, update: &CallStatusUpdate) -> Result<Call, DomainError>;

    /// Inserts or updates the call from its end-of-call report.
    ///
    /// Duration, ended reason, transcript, summary, recording and cost are
    /// always overwritten; the lifecycle state is merged.
    async fn upsert_report(&self, report: &EndOfCallReport) -> Result<Call, DomainError>;

    /// Find a call by its provider call ID.
    async fn find_by_provider_id(
        &self,
        provider_call_id: &ProviderCallId,
    ) -> Result<Option<Call>, DomainError>;

    /// Stores sentiment and priority tags.
    async fn tag(
        &self,
        provider_call_id: &ProviderCallId,
        sentiment: Sentiment,
        priority: Priority,
    ) -> Result<(), DomainError>;

    /// Atomically marks the call as billed.
    ///
    /// Returns `true` for exactly one caller per call; every later (or
    /// concurrent) attempt gets `false`. Returns `false` if the call is unknown.
    async fn claim_billing(&self, provider_call_id: &ProviderCallId) -> Result<bool, DomainError>;
}
