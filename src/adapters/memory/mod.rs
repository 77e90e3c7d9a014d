//! In-memory adapters.
//!
//! Implementations of every port backed by process memory. Used by tests and
//! for running the service locally without PostgreSQL. Data does not survive
//! a restart.

mod alert_sink;
mod call_event_repository;
mod call_repository;
mod subscription_repository;
mod tenant_directory;
mod usage_log_repository;
mod wallet_repository;

pub use alert_sink::InMemoryAlertSink;
pub use call_event_repository::InMemoryCallEventRepository;
pub use call_repository::InMemoryCallRepository;
pub use subscription_repository::InMemorySubscriptionRepository;
pub use tenant_directory::InMemoryTenantDirectory;
pub use usage_log_repository::InMemoryUsageLogRepository;
pub use wallet_repository::InMemoryWalletRepository;
