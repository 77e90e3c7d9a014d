//! Billing handlers.
//!
//! ## Commands
//! - Metering a finished call against the tenant's plan
//! - Dispatching metering onto tracked tasks that outlive the request
//!
//! ## Services
//! - Wallet ledger: debits, credits and reconciliation

mod meter_call_usage;
mod metering_dispatcher;
mod wallet_ledger;

pub use meter_call_usage::{
    MeterCallUsageCommand, MeterCallUsageHandler, MeterCallUsageResult, MeteringReceipt,
};
pub use metering_dispatcher::{MeteringDispatcher, MeteringTasks};
pub use wallet_ledger::{LedgerEntry, Reconciliation, WalletLedgerService};
