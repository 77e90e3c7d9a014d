//! Application layer - command handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::billing::{
    MeterCallUsageCommand, MeterCallUsageHandler, MeterCallUsageResult, WalletLedgerService,
};
pub use handlers::call::{
    AppendTranscriptHandler, AuditFunctionCallHandler, AuthorizeCallHandler, CallGateMessages,
    RecordCallStatusHandler, RecordEndOfCallHandler,
};
pub use handlers::webhook::{
    ProcessProviderEventCommand, ProcessProviderEventHandler, ProcessProviderEventResult,
};
