//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `call` - Call lifecycle, call records and the per-call event log
//! - `billing` - Plans, usage periods, metering, wallets and the spend guard
//! - `provider` - Voice provider webhook authentication and event decoding

pub mod billing;
pub mod call;
pub mod foundation;
pub mod provider;
