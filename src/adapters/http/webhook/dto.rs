//! Response bodies for the provider webhook endpoint.

use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::billing::AssistantDirective;

/// Acknowledgement for every event that needs no answer.
#[derive(Debug, Clone, Serialize)]
pub struct AcknowledgedResponse {
    pub received: bool,
}

impl AcknowledgedResponse {
    pub fn new() -> Self {
        Self { received: true }
    }
}

impl Default for AcknowledgedResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Answer to an `assistant-request`.
///
/// Connect returns the tenant's agent configuration verbatim. Decline returns
/// a transient assistant that speaks one message and ends the call.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantResponse {
    pub assistant: Value,
}

impl From<AssistantDirective> for AssistantResponse {
    fn from(directive: AssistantDirective) -> Self {
        let assistant = match directive {
            AssistantDirective::Connect { agent_config } => agent_config,
            AssistantDirective::Decline { message } => json!({
                "firstMessage": message,
                "endCallAfterSpoken": true,
            }),
        };
        Self { assistant }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decline_speaks_message_and_hangs_up() {
        let response = AssistantResponse::from(AssistantDirective::Decline {
            message: "Line unavailable".to_string(),
        });
        let body = serde_json::to_value(response).unwrap();
        assert_eq!(
            body,
            json!({"assistant": {"firstMessage": "Line unavailable", "endCallAfterSpoken": true}})
        );
    }

    #[test]
    fn connect_returns_agent_config_verbatim() {
        let config = json!({"name": "Front desk", "model": {"provider": "openai"}});
        let response = AssistantResponse::from(AssistantDirective::Connect {
            agent_config: config.clone(),
        });
        assert_eq!(response.assistant, config);
    }

    #[test]
    fn acknowledgement_serializes_received_true() {
        let body = serde_json::to_value(AcknowledgedResponse::new()).unwrap();
        assert_eq!(body, json!({"received": true}));
    }
}
