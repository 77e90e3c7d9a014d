//! ProcessProviderEventHandler - entry point for every provider webhook delivery.
//!
//! Verifies the signature over the raw body, decodes the event and routes it
//! to the matching call handler. Only `assistant-request` produces a payload
//! for the provider; every other event is acknowledged.

use std::sync::Arc;

use crate::application::handlers::call::{
    AppendTranscriptCommand, AppendTranscriptHandler, AuditFunctionCallCommand,
    AuditFunctionCallHandler, AuthorizeCallCommand, AuthorizeCallHandler,
    RecordCallStatusCommand, RecordCallStatusHandler, RecordEndOfCallCommand,
    RecordEndOfCallHandler,
};
use crate::domain::billing::AssistantDirective;
use crate::domain::provider::{ProviderEvent, ProviderSignatureVerifier, WebhookError};

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessProviderEventCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Signature header value, if present.
    pub signature: Option<String>,
}

/// What to send back to the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessProviderEventResult {
    /// Answer to an `assistant-request`.
    Assistant(AssistantDirective),
    Acknowledged,
}

/// Handler for provider webhook deliveries.
pub struct ProcessProviderEventHandler {
    verifier: Arc<ProviderSignatureVerifier>,
    authorize_call: AuthorizeCallHandler,
    record_status: RecordCallStatusHandler,
    record_end_of_call: RecordEndOfCallHandler,
    append_transcript: AppendTranscriptHandler,
    audit_function_call: AuditFunctionCallHandler,
}

impl ProcessProviderEventHandler {
    pub fn new(
        verifier: Arc<ProviderSignatureVerifier>,
        authorize_call: AuthorizeCallHandler,
        record_status: RecordCallStatusHandler,
        record_end_of_call: RecordEndOfCallHandler,
        append_transcript: AppendTranscriptHandler,
        audit_function_call: AuditFunctionCallHandler,
    ) -> Self {
        Self {
            verifier,
            authorize_call,
            record_status,
            record_end_of_call,
            append_transcript,
            audit_function_call,
        }
    }

    /// Processes a delivery.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` / `InvalidSignature` - rejected before parsing
    /// - `ParseError` / `MissingField` - body is not a valid event
    /// - `Database` - the call store could not be read or written
    pub async fn handle(
        &self,
        cmd: ProcessProviderEventCommand,
    ) -> Result<ProcessProviderEventResult, WebhookError> {
        // 1. Authenticate the raw bytes
        self.verifier
            .verify(&cmd.payload, cmd.signature.as_deref())
            .map_err(|err| {
                tracing::warn!(error = %err, "Rejected provider webhook");
                err
            })?;

        // 2. Decode
        let event = ProviderEvent::decode(&cmd.payload).map_err(|err| {
            tracing::error!(error = %err, "Malformed provider webhook");
            err
        })?;
        tracing::debug!(event_type = event.event_type(), "Provider webhook received");

        // 3. Dispatch
        match event {
            ProviderEvent::AssistantRequest(request) => {
                let result = self
                    .authorize_call
                    .handle(AuthorizeCallCommand {
                        provider_call_id: request.provider_call_id,
                        recipient_number: request.recipient_number,
                    })
                    .await?;
                Ok(ProcessProviderEventResult::Assistant(result.directive))
            }
            ProviderEvent::StatusUpdate(update) => {
                self.record_status
                    .handle(RecordCallStatusCommand {
                        provider_call_id: update.provider_call_id,
                        status: update.status,
                        recipient_number: update.recipient_number,
                        caller_number: update.caller_number,
                    })
                    .await?;
                Ok(ProcessProviderEventResult::Acknowledged)
            }
            ProviderEvent::EndOfCallReport(report) => {
                self.record_end_of_call
                    .handle(RecordEndOfCallCommand {
                        provider_call_id: report.provider_call_id,
                        duration_seconds: report.duration_seconds,
                        ended_reason: report.ended_reason,
                        transcript: report.transcript,
                        summary: report.summary,
                        recording_url: report.recording_url,
                        cost_breakdown: report.cost_breakdown,
                        recipient_number: report.recipient_number,
                        caller_number: report.caller_number,
                    })
                    .await?;
                Ok(ProcessProviderEventResult::Acknowledged)
            }
            ProviderEvent::Transcript(segment) => {
                self.append_transcript
                    .handle(AppendTranscriptCommand {
                        provider_call_id: segment.provider_call_id,
                        role: segment.role,
                        text: segment.transcript,
                        transcript_type: segment.transcript_type,
                    })
                    .await?;
                Ok(ProcessProviderEventResult::Acknowledged)
            }
            ProviderEvent::FunctionCall(call) => {
                self.audit_function_call
                    .handle(AuditFunctionCallCommand {
                        provider_call_id: call.provider_call_id,
                        assistant_id: call.assistant_id,
                        name: call.name,
                        parameters: call.parameters,
                    })
                    .await?;
                Ok(ProcessProviderEventResult::Acknowledged)
            }
            ProviderEvent::Unknown { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled provider event acknowledged");
                Ok(ProcessProviderEventResult::Acknowledged)
            }
        }
    }
}
