//! Append-only call events: transcript segments and function-call audits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{CallId, CompanyId, Timestamp};

/// Who spoke a transcript segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Assistant,
    Customer,
    Unknown,
}

impl Speaker {
    /// Maps the provider's `role` field.
    pub fn from_role(role: Option<&str>) -> Speaker {
        match role.map(|r| r.to_ascii_lowercase()) {
            Some(r) if r == "assistant" || r == "bot" => Speaker::Assistant,
            Some(r) if r == "user" || r == "customer" => Speaker::Customer,
            _ => Speaker::Unknown,
        }
    }
}

/// Kind of transcript delivery. Only final segments are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptKind {
    Partial,
    Final,
}

impl TranscriptKind {
    pub fn from_provider(value: Option<&str>) -> TranscriptKind {
        match value {
            Some(v) if v.eq_ignore_ascii_case("final") => TranscriptKind::Final,
            _ => TranscriptKind::Partial,
        }
    }
}

/// Payload of a call event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallEventKind {
    TranscriptSegment {
        speaker: Speaker,
        text: String,
    },
    FunctionCall {
        company_id: CompanyId,
        name: String,
        parameters: Value,
    },
}

impl CallEventKind {
    /// Storage discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallEventKind::TranscriptSegment { .. } => "transcript_segment",
            CallEventKind::FunctionCall { .. } => "function_call",
        }
    }
}

/// One append-only entry in a call's event log.
///
/// Events reference their call by internal ID; the call must exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    pub call_id: CallId,
    pub kind: CallEventKind,
    pub recorded_at: Timestamp,
}

impl CallEvent {
    pub fn transcript(call_id: CallId, speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            call_id,
            kind: CallEventKind::TranscriptSegment {
                speaker,
                text: text.into(),
            },
            recorded_at: Timestamp::now(),
        }
    }

    pub fn function_call(
        call_id: CallId,
        company_id: CompanyId,
        name: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            call_id,
            kind: CallEventKind::FunctionCall {
                company_id,
                name: name.into(),
                parameters,
            },
            recorded_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn speaker_maps_provider_roles() {
        assert_eq!(Speaker::from_role(Some("assistant")), Speaker::Assistant);
        assert_eq!(Speaker::from_role(Some("user")), Speaker::Customer);
        assert_eq!(Speaker::from_role(Some("system")), Speaker::Unknown);
        assert_eq!(Speaker::from_role(None), Speaker::Unknown);
    }

    #[test]
    fn only_final_is_final() {
        assert_eq!(TranscriptKind::from_provider(Some("final")), TranscriptKind::Final);
        assert_eq!(TranscriptKind::from_provider(Some("FINAL")), TranscriptKind::Final);
        assert_eq!(
            TranscriptKind::from_provider(Some("partial")),
            TranscriptKind::Partial
        );
        assert_eq!(TranscriptKind::from_provider(None), TranscriptKind::Partial);
    }

    #[test]
    fn event_kind_serializes_with_tag() {
        let event = CallEvent::transcript(CallId::new(), Speaker::Customer, "hi");
        let json = serde_json::to_value(&event.kind).unwrap();
        assert_eq!(json["kind"], "transcript_segment");
        assert_eq!(json["speaker"], "customer");
        assert_eq!(json["text"], "hi");
    }

    #[test]
    fn function_call_keeps_parameters_verbatim() {
        let params = json!({"date": "2024-05-01", "slots": [1, 2]});
        let event =
            CallEvent::function_call(CallId::new(), CompanyId::new(), "book", params.clone());
        assert_eq!(event.kind.as_str(), "function_call");
        match event.kind {
            CallEventKind::FunctionCall { parameters, .. } => assert_eq!(parameters, params),
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
