//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Production persistence
//! - `memory` - In-process stores for tests and local runs
//! - `alerts` - Operational alert delivery
//! - `http` - The provider webhook endpoint

pub mod alerts;
pub mod http;
pub mod memory;
pub mod postgres;

pub use alerts::TracingAlertSink;
pub use http::{webhook_router, WebhookAppState};
