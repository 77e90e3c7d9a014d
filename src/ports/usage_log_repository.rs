//! UsageLogRepository port - write-once analytics records.
//!
//! Implementations enforce uniqueness of `(reference_id, resource_type)` with a
//! database constraint, so a second log for the same call reports
//! `AlreadyExists` instead of duplicating usage.

use async_trait::async_trait;

use crate::domain::billing::{ResourceType, UsageLog};
use crate::domain::foundation::DomainError;

/// Result of attempting to save a usage log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this reference).
    Inserted,
    /// Record already exists (duplicate).
    AlreadyExists,
}

/// Port for usage log persistence.
#[async_trait]
pub trait UsageLogRepository: Send + Sync {
    /// Saves a log with `ON CONFLICT DO NOTHING` semantics.
    async fn save(&self, log: &UsageLog) -> Result<SaveResult, DomainError>;

    /// Find the log for a reference.
    async fn find_by_reference(
        &self,
        reference_id: &str,
        resource_type: ResourceType,
    ) -> Result<Option<UsageLog>, DomainError>;
}
