//! Provider domain - webhook authentication and event decoding.

mod errors;
mod event;
mod signature;

pub use errors::WebhookError;
pub use event::{
    AssistantRequest, EndOfCallPayload, FunctionCallPayload, ProviderEvent, StatusUpdate,
    TranscriptPayload,
};
pub use signature::{sign_payload, verify_signature, ProviderSignatureVerifier};
