//! Subscription plans and their voice-minute allowances.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Billing plan a tenant subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Starter,
    Growth,
    /// Unlimited voice minutes; never billed for overage.
    Enterprise,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Starter => "starter",
            PlanId::Growth => "growth",
            PlanId::Enterprise => "enterprise",
        }
    }

    /// Returns the display name used in wallet transaction descriptions.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanId::Starter => "Starter",
            PlanId::Growth => "Growth",
            PlanId::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PlanId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(PlanId::Starter),
            "growth" => Ok(PlanId::Growth),
            "enterprise" => Ok(PlanId::Enterprise),
            other => Err(ValidationError::invalid_format(
                "plan_id",
                format!("unknown plan '{}'", other),
            )),
        }
    }
}

/// Overage price per voice minute, in micro-dollars.
///
/// Kept integral so that cent rounding is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverageRate(u64);

impl OverageRate {
    /// Creates a rate from micro-dollars per minute.
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Creates a rate from a dollar amount such as `0.35`.
    pub fn from_dollars(dollars: f64) -> Result<Self, ValidationError> {
        if !dollars.is_finite() || dollars < 0.0 {
            return Err(ValidationError::invalid_format(
                "overage_rate_per_minute",
                format!("must be a non-negative amount, got {}", dollars),
            ));
        }
        Ok(Self((dollars * 1_000_000.0).round() as u64))
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    /// Cost of `minutes` of overage in cents, rounded up.
    pub fn cost_cents(&self, minutes: u32) -> i64 {
        let micros = u64::from(minutes) * self.0;
        ((micros + 9_999) / 10_000) as i64
    }
}

/// Voice-minute allowance of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub plan: PlanId,
    /// Monthly allowance. None = unlimited.
    pub voice_minutes: Option<u32>,
}

impl PlanLimits {
    pub fn is_unlimited(&self) -> bool {
        self.voice_minutes.is_none()
    }
}

/// Plan allowances and the overage price, as configured for this deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    pub starter_voice_minutes: u32,
    pub growth_voice_minutes: u32,
    pub overage_rate: OverageRate,
}

impl PlanCatalog {
    /// Get the limits for a specific plan.
    ///
    /// | Plan | Voice minutes |
    /// |------|---------------|
    /// | Starter | `starter_voice_minutes` |
    /// | Growth | `growth_voice_minutes` |
    /// | Enterprise | Unlimited |
    pub fn limits_for(&self, plan: PlanId) -> PlanLimits {
        let voice_minutes = match plan {
            PlanId::Starter => Some(self.starter_voice_minutes),
            PlanId::Growth => Some(self.growth_voice_minutes),
            PlanId::Enterprise => None,
        };
        PlanLimits {
            plan,
            voice_minutes,
        }
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self {
            starter_voice_minutes: 600,
            growth_voice_minutes: 2000,
            overage_rate: OverageRate::from_micros(350_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enterprise_is_unlimited() {
        let limits = PlanCatalog::default().limits_for(PlanId::Enterprise);
        assert!(limits.is_unlimited());
    }

    #[test]
    fn starter_and_growth_use_configured_allowances() {
        let catalog = PlanCatalog {
            starter_voice_minutes: 240,
            growth_voice_minutes: 1000,
            overage_rate: OverageRate::from_micros(350_000),
        };
        assert_eq!(catalog.limits_for(PlanId::Starter).voice_minutes, Some(240));
        assert_eq!(catalog.limits_for(PlanId::Growth).voice_minutes, Some(1000));
    }

    #[test]
    fn rate_from_dollars_is_exact() {
        assert_eq!(OverageRate::from_dollars(0.35).unwrap().as_micros(), 350_000);
        assert_eq!(OverageRate::from_dollars(0.0).unwrap().as_micros(), 0);
    }

    #[test]
    fn negative_rate_is_rejected() {
        assert!(OverageRate::from_dollars(-0.01).is_err());
        assert!(OverageRate::from_dollars(f64::NAN).is_err());
    }

    #[test]
    fn cost_rounds_up_to_whole_cents() {
        let rate = OverageRate::from_micros(350_000);
        assert_eq!(rate.cost_cents(3), 105);
        assert_eq!(rate.cost_cents(0), 0);

        let odd = OverageRate::from_micros(333_333);
        assert_eq!(odd.cost_cents(1), 34);
    }

    #[test]
    fn plan_id_round_trips_through_storage_string() {
        for plan in [PlanId::Starter, PlanId::Growth, PlanId::Enterprise] {
            assert_eq!(plan.as_str().parse::<PlanId>().unwrap(), plan);
        }
        assert!("platinum".parse::<PlanId>().is_err());
    }
}
