//! Billing domain - plans, usage periods, metering, wallets and the spend guard.

mod errors;
mod metering;
mod plan;
mod spend_guard;
mod subscription;
mod usage_log;
mod wallet;

pub use errors::BillingError;
pub use metering::{billable_minutes, MeteringBasis, UsageCharge};
pub use plan::{OverageRate, PlanCatalog, PlanId, PlanLimits};
pub use spend_guard::{AssistantDirective, SpendDecision, SpendGuard};
pub use subscription::{Subscription, SubscriptionStatus, UsagePeriod};
pub use usage_log::{ResourceType, UsageLog};
pub use wallet::{TransactionType, Wallet, WalletTransaction};
