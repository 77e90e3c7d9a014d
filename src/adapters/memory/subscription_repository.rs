//! In-memory subscriptions and usage periods.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::billing::{Subscription, UsagePeriod};
use crate::domain::foundation::{
    CompanyId, DomainError, ErrorCode, SubscriptionId, Timestamp, UsagePeriodId,
};
use crate::ports::SubscriptionRepository;

/// In-memory implementation of the SubscriptionRepository port.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<Vec<Subscription>>,
    periods: RwLock<Vec<UsagePeriod>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_subscription(&self, subscription: Subscription) {
        self.subscriptions.write().await.push(subscription);
    }

    pub async fn insert_period(&self, period: UsagePeriod) {
        self.periods.write().await.push(period);
    }

    /// Returns a snapshot of a period.
    pub async fn period(&self, period_id: &UsagePeriodId) -> Option<UsagePeriod> {
        self.periods
            .read()
            .await
            .iter()
            .find(|p| &p.id == period_id)
            .cloned()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_active(&self, company_id: &CompanyId) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .iter()
            .find(|s| &s.company_id == company_id && s.is_active())
            .cloned())
    }

    async fn find_current_period(
        &self,
        subscription_id: &SubscriptionId,
        at: Timestamp,
    ) -> Result<Option<UsagePeriod>, DomainError> {
        Ok(self
            .periods
            .read()
            .await
            .iter()
            .find(|p| &p.subscription_id == subscription_id && p.contains(&at))
            .cloned())
    }

    async fn increment_voice_minutes(
        &self,
        period_id: &UsagePeriodId,
        minutes: u32,
    ) -> Result<u32, DomainError> {
        let mut periods = self.periods.write().await;
        let period = periods
            .iter_mut()
            .find(|p| &p.id == period_id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::DatabaseError, "Usage period not found")
                    .with_detail("period_id", period_id.to_string())
            })?;
        period.voice_minutes_used = period.voice_minutes_used.saturating_add(minutes);
        Ok(period.voice_minutes_used)
    }
}
