//! SubscriptionRepository port - active plan and usage-period counters.

use async_trait::async_trait;

use crate::domain::billing::{Subscription, UsagePeriod};
use crate::domain::foundation::{CompanyId, DomainError, SubscriptionId, Timestamp, UsagePeriodId};

/// Port for subscription and usage-period access.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Returns the tenant's subscription with status `active`, if any.
    async fn find_active(&self, company_id: &CompanyId) -> Result<Option<Subscription>, DomainError>;

    /// Returns the usage period with `period_start <= at < period_end`.
    async fn find_current_period(
        &self,
        subscription_id: &SubscriptionId,
        at: Timestamp,
    ) -> Result<Option<UsagePeriod>, DomainError>;

    /// Atomically adds minutes to the period counter and returns the new total.
    ///
    /// Must be a single storage-level increment, never read-modify-write.
    async fn increment_voice_minutes(
        &self,
        period_id: &UsagePeriodId,
        minutes: u32,
    ) -> Result<u32, DomainError>;
}
