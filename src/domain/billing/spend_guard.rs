//! Pre-call spending gate.
//!
//! Decides, before a call is connected to an agent, whether the tenant may
//! take the call. The decision is a pure function of the active plan and the
//! wallet balance, evaluated in order:
//!
//! 1. Unlimited plan: allow.
//! 2. Positive wallet balance: allow.
//! 3. Otherwise: reject.

use serde::Serialize;
use serde_json::Value;

use super::PlanLimits;

/// Result of the pre-call check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SpendDecision {
    /// Plan has unlimited voice minutes.
    AllowUnlimited,
    /// Wallet can absorb overage.
    AllowFunded { balance_cents: i64 },
    /// Not unlimited and the wallet is empty or missing.
    RejectInsufficientFunds,
}

impl SpendDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, SpendDecision::RejectInsufficientFunds)
    }
}

/// Stateless spend guard.
pub struct SpendGuard;

impl SpendGuard {
    /// `limits` is `None` without an active subscription; a missing wallet is
    /// passed as `None` and treated as a zero balance.
    pub fn decide(limits: Option<&PlanLimits>, balance_cents: Option<i64>) -> SpendDecision {
        if limits.is_some_and(|l| l.is_unlimited()) {
            return SpendDecision::AllowUnlimited;
        }
        match balance_cents {
            Some(balance) if balance > 0 => SpendDecision::AllowFunded {
                balance_cents: balance,
            },
            _ => SpendDecision::RejectInsufficientFunds,
        }
    }
}

/// What the provider is told to do with an incoming call.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantDirective {
    /// Connect the tenant's agent with this configuration.
    Connect { agent_config: Value },
    /// Speak a message and hang up without connecting an agent.
    Decline { message: String },
}

impl AssistantDirective {
    pub fn is_decline(&self) -> bool {
        matches!(self, AssistantDirective::Decline { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanId;
    use proptest::prelude::*;

    fn starter() -> PlanLimits {
        PlanLimits {
            plan: PlanId::Starter,
            voice_minutes: Some(600),
        }
    }

    fn enterprise() -> PlanLimits {
        PlanLimits {
            plan: PlanId::Enterprise,
            voice_minutes: None,
        }
    }

    #[test]
    fn unlimited_plan_allows_with_empty_wallet() {
        assert_eq!(
            SpendGuard::decide(Some(&enterprise()), Some(0)),
            SpendDecision::AllowUnlimited
        );
        assert_eq!(
            SpendGuard::decide(Some(&enterprise()), None),
            SpendDecision::AllowUnlimited
        );
    }

    #[test]
    fn funded_wallet_allows() {
        assert_eq!(
            SpendGuard::decide(Some(&starter()), Some(500)),
            SpendDecision::AllowFunded { balance_cents: 500 }
        );
    }

    #[test]
    fn funded_wallet_allows_without_subscription() {
        assert!(SpendGuard::decide(None, Some(1)).is_allowed());
    }

    #[test]
    fn empty_wallet_rejects() {
        assert_eq!(
            SpendGuard::decide(Some(&starter()), Some(0)),
            SpendDecision::RejectInsufficientFunds
        );
    }

    #[test]
    fn missing_wallet_rejects() {
        assert_eq!(
            SpendGuard::decide(None, None),
            SpendDecision::RejectInsufficientFunds
        );
    }

    #[test]
    fn negative_balance_rejects() {
        assert!(!SpendGuard::decide(Some(&starter()), Some(-250)).is_allowed());
    }

    proptest! {
        #[test]
        fn decision_depends_only_on_plan_and_sign_of_balance(balance in any::<i64>()) {
            let limited = SpendGuard::decide(Some(&starter()), Some(balance));
            prop_assert_eq!(limited.is_allowed(), balance > 0);
            prop_assert!(SpendGuard::decide(Some(&enterprise()), Some(balance)).is_allowed());
        }
    }
}
