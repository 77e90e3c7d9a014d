//! AppendTranscriptHandler - records final transcript segments.

use std::sync::Arc;

use crate::domain::call::{CallEvent, Speaker, TranscriptKind};
use crate::domain::foundation::{CallId, DomainError, ProviderCallId};
use crate::ports::{CallEventRepository, CallRepository};

/// Command to append a transcript segment.
#[derive(Debug, Clone)]
pub struct AppendTranscriptCommand {
    pub provider_call_id: ProviderCallId,
    pub role: Option<String>,
    pub text: String,
    pub transcript_type: Option<String>,
}

/// Result of appending a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendTranscriptResult {
    Appended { call_id: CallId },
    /// Partial segments are not persisted.
    SkippedPartial,
    /// No call record exists yet; the segment is dropped.
    DroppedUnknownCall,
}

/// Handler for transcript segments.
pub struct AppendTranscriptHandler {
    calls: Arc<dyn CallRepository>,
    events: Arc<dyn CallEventRepository>,
}

impl AppendTranscriptHandler {
    pub fn new(calls: Arc<dyn CallRepository>, events: Arc<dyn CallEventRepository>) -> Self {
        Self { calls, events }
    }

    pub async fn handle(
        &self,
        cmd: AppendTranscriptCommand,
    ) -> Result<AppendTranscriptResult, DomainError> {
        if TranscriptKind::from_provider(cmd.transcript_type.as_deref()) != TranscriptKind::Final {
            return Ok(AppendTranscriptResult::SkippedPartial);
        }

        let Some(call) = self.calls.find_by_provider_id(&cmd.provider_call_id).await? else {
            tracing::warn!(
                provider_call_id = %cmd.provider_call_id,
                "Transcript segment for unknown call dropped"
            );
            return Ok(AppendTranscriptResult::DroppedUnknownCall);
        };

        let speaker = Speaker::from_role(cmd.role.as_deref());
        self.events
            .append(&CallEvent::transcript(call.id, speaker, cmd.text))
            .await?;

        Ok(AppendTranscriptResult::Appended { call_id: call.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryCallEventRepository, InMemoryCallRepository};
    use crate::domain::call::{CallEventKind, CallLifecycle, CallStatusUpdate};

    fn setup() -> (
        AppendTranscriptHandler,
        Arc<InMemoryCallRepository>,
        Arc<InMemoryCallEventRepository>,
    ) {
        let calls = Arc::new(InMemoryCallRepository::new());
        let events = Arc::new(InMemoryCallEventRepository::new());
        (
            AppendTranscriptHandler::new(calls.clone(), events.clone()),
            calls,
            events,
        )
    }

    fn command(transcript_type: &str) -> AppendTranscriptCommand {
        AppendTranscriptCommand {
            provider_call_id: ProviderCallId::new("call-1").unwrap(),
            role: Some("user".to_string()),
            text: "I need to reschedule".to_string(),
            transcript_type: Some(transcript_type.to_string()),
        }
    }

    async fn start_call(calls: &InMemoryCallRepository) -> CallId {
        calls
            .upsert_status(&CallStatusUpdate {
                provider_call_id: ProviderCallId::new("call-1").unwrap(),
                lifecycle: CallLifecycle::InProgress,
                tenant: None,
                caller_number: None,
                recipient_number: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn final_segment_is_appended_to_call() {
        let (handler, calls, events) = setup();
        let call_id = start_call(&calls).await;

        let result = handler.handle(command("final")).await.unwrap();

        assert_eq!(result, AppendTranscriptResult::Appended { call_id });
        let stored = events.list_for_call(&call_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0].kind,
            CallEventKind::TranscriptSegment {
                speaker: Speaker::Customer,
                text: "I need to reschedule".to_string()
            }
        );
    }

    #[tokio::test]
    async fn partial_segment_is_skipped() {
        let (handler, calls, events) = setup();
        start_call(&calls).await;

        let result = handler.handle(command("partial")).await.unwrap();

        assert_eq!(result, AppendTranscriptResult::SkippedPartial);
        assert!(events.is_empty().await);
    }

    #[tokio::test]
    async fn segment_for_unknown_call_is_dropped_without_placeholder() {
        let (handler, calls, events) = setup();

        let result = handler.handle(command("final")).await.unwrap();

        assert_eq!(result, AppendTranscriptResult::DroppedUnknownCall);
        assert!(events.is_empty().await);
        assert!(calls.is_empty().await);
    }
}
