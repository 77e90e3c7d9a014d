//! Call handlers.
//!
//! ## Commands
//! - Authorizing inbound calls (spend guard)
//! - Recording status updates and end-of-call reports
//! - Appending transcript segments
//! - Auditing agent function calls

mod append_transcript;
mod audit_function_call;
mod authorize_call;
mod record_call_status;
mod record_end_of_call;

pub use append_transcript::{
    AppendTranscriptCommand, AppendTranscriptHandler, AppendTranscriptResult,
};
pub use audit_function_call::{
    AuditFunctionCallCommand, AuditFunctionCallHandler, AuditFunctionCallResult,
};
pub use authorize_call::{
    AuthorizeCallCommand, AuthorizeCallHandler, AuthorizeCallResult, CallGateMessages,
};
pub use record_call_status::{
    RecordCallStatusCommand, RecordCallStatusHandler, RecordCallStatusResult,
};
pub use record_end_of_call::{
    RecordEndOfCallCommand, RecordEndOfCallHandler, RecordEndOfCallResult,
};
