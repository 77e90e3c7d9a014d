//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Call Ports
//!
//! - `CallRepository` - Idempotent call record store keyed by provider call ID
//! - `CallEventRepository` - Append-only transcript and function-call log
//! - `TenantResolver` - Phone number / assistant to tenant lookups
//!
//! ## Billing Ports
//!
//! - `SubscriptionRepository` - Active plan and usage-period counters
//! - `WalletRepository` - Atomic wallet balance and transaction log
//! - `UsageLogRepository` - Write-once usage analytics
//!
//! ## Operations
//!
//! - `AlertSink` - Alerts for failures that must not fail a webhook

mod alert_sink;
mod call_event_repository;
mod call_repository;
mod subscription_repository;
mod tenant_resolver;
mod usage_log_repository;
mod wallet_repository;

pub use alert_sink::{AlertKind, AlertSeverity, AlertSink, OperationalAlert};
pub use call_event_repository::CallEventRepository;
pub use call_repository::CallRepository;
pub use subscription_repository::SubscriptionRepository;
pub use tenant_resolver::{TenantAssignment, TenantResolver};
pub use usage_log_repository::{SaveResult, UsageLogRepository};
pub use wallet_repository::WalletRepository;
