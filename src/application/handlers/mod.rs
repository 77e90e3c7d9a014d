//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod billing;
pub mod call;
pub mod webhook;
