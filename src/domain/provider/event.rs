//! Provider webhook event types.
//!
//! Deliveries are JSON objects discriminated by a `type` field. The provider
//! usually wraps the event in a top-level `message` object; bare events are
//! accepted too. Only fields relevant to our processing are captured; opaque
//! structures (cost breakdowns, function parameters) are kept as JSON.

use serde::Deserialize;
use serde_json::Value;

use super::WebhookError;
use crate::domain::foundation::{AssistantId, PhoneNumber, ProviderCallId};

// ════════════════════════════════════════════════════════════════════════════
// Typed events
// ════════════════════════════════════════════════════════════════════════════

/// A decoded provider event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    AssistantRequest(AssistantRequest),
    StatusUpdate(StatusUpdate),
    EndOfCallReport(EndOfCallPayload),
    Transcript(TranscriptPayload),
    FunctionCall(FunctionCallPayload),
    /// Event type we do not handle; acknowledged without side effects.
    Unknown { event_type: String },
}

/// Inbound call asking which assistant should answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantRequest {
    pub provider_call_id: Option<ProviderCallId>,
    /// Number that was dialed; selects the tenant.
    pub recipient_number: Option<PhoneNumber>,
    pub caller_number: Option<PhoneNumber>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub provider_call_id: ProviderCallId,
    pub status: String,
    pub recipient_number: Option<PhoneNumber>,
    pub caller_number: Option<PhoneNumber>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndOfCallPayload {
    pub provider_call_id: ProviderCallId,
    /// Whole seconds, rounded up; 0 when the provider sent none.
    pub duration_seconds: u32,
    pub ended_reason: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub recording_url: Option<String>,
    pub cost_breakdown: Option<Value>,
    pub recipient_number: Option<PhoneNumber>,
    pub caller_number: Option<PhoneNumber>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptPayload {
    pub provider_call_id: ProviderCallId,
    pub role: Option<String>,
    pub transcript: String,
    pub transcript_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallPayload {
    pub provider_call_id: ProviderCallId,
    pub assistant_id: Option<AssistantId>,
    pub name: String,
    pub parameters: Value,
}

impl ProviderEvent {
    /// Decodes a raw webhook body.
    ///
    /// # Errors
    ///
    /// - `ParseError` - body is not JSON or a field has the wrong shape
    /// - `MissingField` - `type` or a field the event needs is absent
    pub fn decode(payload: &[u8]) -> Result<ProviderEvent, WebhookError> {
        let body: Value = serde_json::from_slice(payload)?;
        let message = match body.get("message") {
            Some(inner) if inner.is_object() => inner.clone(),
            _ => body,
        };

        let event_type = message
            .get("type")
            .and_then(Value::as_str)
            .ok_or(WebhookError::MissingField("type"))?
            .to_string();

        let raw: RawMessage = serde_json::from_value(message)?;
        match raw {
            RawMessage::AssistantRequest(body) => Ok(ProviderEvent::AssistantRequest(
                AssistantRequest {
                    provider_call_id: body.call_id().ok(),
                    recipient_number: body.recipient_number(),
                    caller_number: body.caller_number(),
                },
            )),
            RawMessage::StatusUpdate(body) => {
                let status = body
                    .status
                    .clone()
                    .or_else(|| body.call.as_ref().and_then(|c| c.status.clone()))
                    .ok_or(WebhookError::MissingField("status"))?;
                Ok(ProviderEvent::StatusUpdate(StatusUpdate {
                    provider_call_id: body.call_id()?,
                    status,
                    recipient_number: body.recipient_number(),
                    caller_number: body.caller_number(),
                }))
            }
            RawMessage::EndOfCallReport(body) => {
                Ok(ProviderEvent::EndOfCallReport(EndOfCallPayload {
                    provider_call_id: body.call_id()?,
                    duration_seconds: body.duration_seconds(),
                    ended_reason: body.ended_reason(),
                    transcript: body.transcript.clone(),
                    summary: body.summary.clone(),
                    recording_url: body.recording_url(),
                    cost_breakdown: body.cost_breakdown(),
                    recipient_number: body.recipient_number(),
                    caller_number: body.caller_number(),
                }))
            }
            RawMessage::Transcript(body) => Ok(ProviderEvent::Transcript(TranscriptPayload {
                provider_call_id: body.call_id()?,
                role: body.role.clone(),
                transcript: body
                    .transcript
                    .clone()
                    .ok_or(WebhookError::MissingField("transcript"))?,
                transcript_type: body.transcript_type.clone(),
            })),
            RawMessage::FunctionCall(body) => {
                let function = body
                    .function_call
                    .clone()
                    .ok_or(WebhookError::MissingField("functionCall"))?;
                Ok(ProviderEvent::FunctionCall(FunctionCallPayload {
                    provider_call_id: body.call_id()?,
                    assistant_id: body
                        .call
                        .as_ref()
                        .and_then(|c| c.assistant_id.as_deref())
                        .and_then(|id| AssistantId::new(id).ok()),
                    name: function.name,
                    parameters: function.parameters.unwrap_or(Value::Null),
                }))
            }
            RawMessage::Unknown => Ok(ProviderEvent::Unknown { event_type }),
        }
    }

    /// Event type name, for logging.
    pub fn event_type(&self) -> &str {
        match self {
            ProviderEvent::AssistantRequest(_) => "assistant-request",
            ProviderEvent::StatusUpdate(_) => "status-update",
            ProviderEvent::EndOfCallReport(_) => "end-of-call-report",
            ProviderEvent::Transcript(_) => "transcript",
            ProviderEvent::FunctionCall(_) => "function-call",
            ProviderEvent::Unknown { event_type } => event_type,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Wire format
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RawMessage {
    AssistantRequest(RawBody),
    StatusUpdate(RawBody),
    EndOfCallReport(RawBody),
    Transcript(RawBody),
    FunctionCall(RawBody),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBody {
    call: Option<RawCall>,
    status: Option<String>,
    ended_reason: Option<String>,
    duration_seconds: Option<f64>,
    transcript: Option<String>,
    summary: Option<String>,
    recording_url: Option<String>,
    recording: Option<RawRecording>,
    cost_breakdown: Option<Value>,
    cost: Option<Value>,
    role: Option<String>,
    transcript_type: Option<String>,
    function_call: Option<RawFunctionCall>,
    phone_number: Option<RawPhone>,
    customer: Option<RawPhone>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCall {
    id: Option<String>,
    status: Option<String>,
    assistant_id: Option<String>,
    phone_number: Option<RawPhone>,
    customer: Option<RawPhone>,
    duration: Option<f64>,
    ended_reason: Option<String>,
    cost: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawPhone {
    number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRecording {
    url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawFunctionCall {
    name: String,
    parameters: Option<Value>,
}

impl RawBody {
    fn call_id(&self) -> Result<ProviderCallId, WebhookError> {
        self.call
            .as_ref()
            .and_then(|c| c.id.as_deref())
            .and_then(|id| ProviderCallId::new(id).ok())
            .ok_or(WebhookError::MissingField("call.id"))
    }

    fn recipient_number(&self) -> Option<PhoneNumber> {
        let from_call = self.call.as_ref().and_then(|c| c.phone_number.as_ref());
        phone(from_call.or(self.phone_number.as_ref()))
    }

    fn caller_number(&self) -> Option<PhoneNumber> {
        let from_call = self.call.as_ref().and_then(|c| c.customer.as_ref());
        phone(from_call.or(self.customer.as_ref()))
    }

    fn duration_seconds(&self) -> u32 {
        let raw = self
            .call
            .as_ref()
            .and_then(|c| c.duration)
            .or(self.duration_seconds)
            .unwrap_or(0.0);
        if !raw.is_finite() || raw <= 0.0 {
            return 0;
        }
        raw.ceil().min(f64::from(u32::MAX)) as u32
    }

    fn ended_reason(&self) -> Option<String> {
        self.call
            .as_ref()
            .and_then(|c| c.ended_reason.clone())
            .or_else(|| self.ended_reason.clone())
    }

    fn recording_url(&self) -> Option<String> {
        self.recording
            .as_ref()
            .and_then(|r| r.url.clone())
            .or_else(|| self.recording_url.clone())
    }

    fn cost_breakdown(&self) -> Option<Value> {
        self.cost_breakdown
            .clone()
            .or_else(|| self.call.as_ref().and_then(|c| c.cost.clone()))
            .or_else(|| self.cost.clone())
    }
}

fn phone(raw: Option<&RawPhone>) -> Option<PhoneNumber> {
    raw.and_then(|p| p.number.as_deref())
        .and_then(|n| PhoneNumber::new(n).ok())
}
