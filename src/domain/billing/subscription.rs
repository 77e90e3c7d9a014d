//! Tenant subscriptions and their usage periods.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::PlanId;
use crate::domain::foundation::{
    CompanyId, SubscriptionId, Timestamp, UsagePeriodId, ValidationError,
};

/// Subscription status as maintained by the payment integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" | "cancelled" => Ok(SubscriptionStatus::Canceled),
            other => Err(ValidationError::invalid_format(
                "subscription_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// A tenant's subscription to a plan.
///
/// At most one subscription per tenant is `Active`; only that one is used
/// for pre-call authorization and metering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub company_id: CompanyId,
    pub plan: PlanId,
    pub status: SubscriptionStatus,
    pub created_at: Timestamp,
}

impl Subscription {
    pub fn active(company_id: CompanyId, plan: PlanId) -> Self {
        Self {
            id: SubscriptionId::new(),
            company_id,
            plan,
            status: SubscriptionStatus::Active,
            created_at: Timestamp::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

/// Billing window `[period_start, period_end)` of a subscription.
///
/// `voice_minutes_used` only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsagePeriod {
    pub id: UsagePeriodId,
    pub subscription_id: SubscriptionId,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub voice_minutes_used: u32,
}

impl UsagePeriod {
    /// Creates a fresh period. Fails if the window is empty.
    pub fn new(
        subscription_id: SubscriptionId,
        period_start: Timestamp,
        period_end: Timestamp,
    ) -> Result<Self, ValidationError> {
        if !period_start.is_before(&period_end) {
            return Err(ValidationError::invalid_format(
                "usage_period",
                "period_start must be before period_end",
            ));
        }
        Ok(Self {
            id: UsagePeriodId::new(),
            subscription_id,
            period_start,
            period_end,
            voice_minutes_used: 0,
        })
    }

    pub fn contains(&self, at: &Timestamp) -> bool {
        at.is_within(&self.period_start, &self.period_end)
    }

    /// Remaining allowance against a plan limit, never negative.
    pub fn remaining(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.voice_minutes_used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(used: u32) -> UsagePeriod {
        let start = Timestamp::now().plus_days(-1);
        let mut period = UsagePeriod::new(SubscriptionId::new(), start, start.plus_days(30))
            .unwrap();
        period.voice_minutes_used = used;
        period
    }

    #[test]
    fn only_active_status_is_active() {
        let mut sub = Subscription::active(CompanyId::new(), PlanId::Starter);
        assert!(sub.is_active());

        for status in [
            SubscriptionStatus::Trialing,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
        ] {
            sub.status = status;
            assert!(!sub.is_active());
        }
    }

    #[test]
    fn status_parses_both_cancel_spellings() {
        assert_eq!(
            "cancelled".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Canceled
        );
        assert_eq!(
            "past_due".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::PastDue
        );
        assert!("paused".parse::<SubscriptionStatus>().is_err());
    }

    #[test]
    fn empty_window_is_rejected() {
        let now = Timestamp::now();
        assert!(UsagePeriod::new(SubscriptionId::new(), now, now).is_err());
    }

    #[test]
    fn period_contains_now() {
        assert!(period(0).contains(&Timestamp::now()));
        assert!(!period(0).contains(&Timestamp::now().plus_days(60)));
    }

    #[test]
    fn remaining_saturates_at_zero() {
        assert_eq!(period(238).remaining(240), 2);
        assert_eq!(period(300).remaining(240), 0);
    }
}
