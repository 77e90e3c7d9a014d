//! Callmeter - Call lifecycle tracking and usage metering for AI voice agents
//!
//! This crate receives voice provider webhooks, keeps one idempotent record
//! per call, gates inbound calls on prepaid balance and bills each finished
//! call exactly once against the tenant's plan allowance and wallet.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
