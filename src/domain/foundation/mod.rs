//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine contract, and error
//! types shared by the call and billing domains.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    AgentId, AssistantId, CallId, CompanyId, PhoneNumber, ProviderCallId, SubscriptionId,
    UsagePeriodId, WalletId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
