//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresCallRepository` - Call records with SQL-side lifecycle merge
//! - `PostgresCallEventRepository` - Transcript and function-call log
//! - `PostgresTenantResolver` - Phone number and assistant lookups
//! - `PostgresSubscriptionRepository` - Plans and usage-period counters
//! - `PostgresWalletRepository` - Wallet balances and transactions
//! - `PostgresUsageLogRepository` - Write-once usage analytics

mod call_event_repository;
mod call_repository;
mod subscription_repository;
mod tenant_resolver;
mod usage_log_repository;
mod wallet_repository;

pub use call_event_repository::PostgresCallEventRepository;
pub use call_repository::PostgresCallRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use tenant_resolver::PostgresTenantResolver;
pub use usage_log_repository::PostgresUsageLogRepository;
pub use wallet_repository::PostgresWalletRepository;
