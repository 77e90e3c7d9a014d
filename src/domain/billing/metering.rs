//! Pure usage metering math.
//!
//! Given a finished call's billable minutes, the tenant's plan and its current
//! usage period, computes how many minutes the plan allowance covers and what
//! the remaining overage costs.

use serde::{Deserialize, Serialize};

use super::{OverageRate, PlanLimits, UsagePeriod};

/// Rounds a call duration up to whole minutes.
pub fn billable_minutes(duration_seconds: u32) -> u32 {
    duration_seconds / 60 + u32::from(duration_seconds % 60 != 0)
}

/// What the charge was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeteringBasis {
    /// No active subscription: every minute is overage.
    NoSubscription,
    /// Active subscription without a period covering now: every minute is overage.
    NoUsagePeriod,
    /// Unlimited plan: never overage.
    Unlimited,
    /// Metered against the plan allowance.
    Allowance,
}

/// Outcome of metering one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCharge {
    pub basis: MeteringBasis,
    pub call_minutes: u32,
    pub covered_minutes: u32,
    pub overage_minutes: u32,
    pub overage_cost_cents: i64,
}

impl UsageCharge {
    /// Computes the charge for `call_minutes`.
    ///
    /// `limits` is `None` when the tenant has no active subscription. An
    /// unlimited plan is never charged, even without a usage period.
    pub fn compute(
        call_minutes: u32,
        limits: Option<&PlanLimits>,
        period: Option<&UsagePeriod>,
        rate: OverageRate,
    ) -> Self {
        let (basis, covered) = match (limits, period) {
            (None, _) => (MeteringBasis::NoSubscription, 0),
            (Some(limits), _) if limits.is_unlimited() => (MeteringBasis::Unlimited, call_minutes),
            (Some(_), None) => (MeteringBasis::NoUsagePeriod, 0),
            (Some(limits), Some(period)) => {
                let remaining = period.remaining(limits.voice_minutes.unwrap_or(0));
                (MeteringBasis::Allowance, remaining.min(call_minutes))
            }
        };
        let overage_minutes = call_minutes - covered;

        Self {
            basis,
            call_minutes,
            covered_minutes: covered,
            overage_minutes,
            overage_cost_cents: rate.cost_cents(overage_minutes),
        }
    }

    pub fn has_overage(&self) -> bool {
        self.overage_minutes > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanId;
    use crate::domain::foundation::{SubscriptionId, Timestamp};
    use proptest::prelude::*;

    const RATE: OverageRate = OverageRate::from_micros(350_000);

    fn limits(minutes: Option<u32>) -> PlanLimits {
        PlanLimits {
            plan: if minutes.is_some() {
                PlanId::Starter
            } else {
                PlanId::Enterprise
            },
            voice_minutes: minutes,
        }
    }

    fn period(used: u32) -> UsagePeriod {
        let start = Timestamp::now().plus_days(-1);
        let mut period =
            UsagePeriod::new(SubscriptionId::new(), start, start.plus_days(30)).unwrap();
        period.voice_minutes_used = used;
        period
    }

    // ══════════════════════════════════════════════════════════════
    // Rounding
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn partial_minutes_round_up() {
        assert_eq!(billable_minutes(0), 0);
        assert_eq!(billable_minutes(1), 1);
        assert_eq!(billable_minutes(60), 1);
        assert_eq!(billable_minutes(61), 2);
        assert_eq!(billable_minutes(300), 5);
        assert_eq!(billable_minutes(301), 6);
    }

    // ══════════════════════════════════════════════════════════════
    // Charge computation
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn call_crossing_allowance_is_split() {
        let charge = UsageCharge::compute(5, Some(&limits(Some(240))), Some(&period(238)), RATE);

        assert_eq!(charge.basis, MeteringBasis::Allowance);
        assert_eq!(charge.covered_minutes, 2);
        assert_eq!(charge.overage_minutes, 3);
        assert_eq!(charge.overage_cost_cents, 105);
    }

    #[test]
    fn call_within_allowance_has_no_overage() {
        let charge = UsageCharge::compute(5, Some(&limits(Some(240))), Some(&period(10)), RATE);
        assert!(!charge.has_overage());
        assert_eq!(charge.overage_cost_cents, 0);
    }

    #[test]
    fn exhausted_allowance_is_all_overage() {
        let charge = UsageCharge::compute(4, Some(&limits(Some(240))), Some(&period(500)), RATE);
        assert_eq!(charge.overage_minutes, 4);
    }

    #[test]
    fn no_subscription_is_all_overage() {
        let charge = UsageCharge::compute(6, None, None, RATE);
        assert_eq!(charge.basis, MeteringBasis::NoSubscription);
        assert_eq!(charge.overage_minutes, 6);
        assert_eq!(charge.overage_cost_cents, 210);
    }

    #[test]
    fn missing_period_is_all_overage() {
        let charge = UsageCharge::compute(2, Some(&limits(Some(240))), None, RATE);
        assert_eq!(charge.basis, MeteringBasis::NoUsagePeriod);
        assert_eq!(charge.overage_minutes, 2);
    }

    #[test]
    fn unlimited_plan_without_period_is_not_charged() {
        let charge = UsageCharge::compute(90, Some(&limits(None)), None, RATE);
        assert_eq!(charge.basis, MeteringBasis::Unlimited);
        assert_eq!(charge.overage_minutes, 0);
    }

    proptest! {
        #[test]
        fn covered_plus_overage_is_call_minutes(
            minutes in 0u32..10_000,
            limit in 0u32..5_000,
            used in 0u32..10_000
        ) {
            let charge = UsageCharge::compute(minutes, Some(&limits(Some(limit))), Some(&period(used)), RATE);
            prop_assert_eq!(charge.covered_minutes + charge.overage_minutes, minutes);
            prop_assert!(charge.covered_minutes <= limit.saturating_sub(used));
        }

        #[test]
        fn unlimited_plan_never_has_overage(minutes in 0u32..100_000, used in 0u32..100_000) {
            let charge = UsageCharge::compute(minutes, Some(&limits(None)), Some(&period(used)), RATE);
            prop_assert_eq!(charge.overage_minutes, 0);
            prop_assert_eq!(charge.overage_cost_cents, 0);
        }

        #[test]
        fn billable_minutes_cover_duration(seconds in 0u32..1_000_000) {
            let minutes = billable_minutes(seconds);
            prop_assert!(minutes * 60 >= seconds);
            prop_assert!(minutes * 60 < seconds + 60);
        }
    }
}
