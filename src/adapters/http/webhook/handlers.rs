//! HTTP handler for the provider webhook endpoint.
//!
//! Connects the axum route to the webhook command handler.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::billing::{
    MeterCallUsageHandler, MeteringDispatcher, MeteringTasks, WalletLedgerService,
};
use crate::application::handlers::call::{
    AppendTranscriptHandler, AuditFunctionCallHandler, AuthorizeCallHandler, CallGateMessages,
    RecordCallStatusHandler, RecordEndOfCallHandler,
};
use crate::application::handlers::webhook::{
    ProcessProviderEventCommand, ProcessProviderEventHandler, ProcessProviderEventResult,
};
use crate::domain::billing::PlanCatalog;
use crate::domain::provider::{ProviderSignatureVerifier, WebhookError};
use crate::ports::{
    AlertSink, CallEventRepository, CallRepository, SubscriptionRepository, TenantResolver,
    UsageLogRepository, WalletRepository,
};

use super::dto::{AcknowledgedResponse, AssistantResponse, ErrorResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the webhook endpoint.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct WebhookAppState {
    pub calls: Arc<dyn CallRepository>,
    pub call_events: Arc<dyn CallEventRepository>,
    pub tenants: Arc<dyn TenantResolver>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub wallets: Arc<dyn WalletRepository>,
    pub usage_logs: Arc<dyn UsageLogRepository>,
    pub alerts: Arc<dyn AlertSink>,
    pub verifier: Arc<ProviderSignatureVerifier>,
    /// Header carrying the body signature.
    pub signature_header: HeaderName,
    pub catalog: PlanCatalog,
    pub messages: CallGateMessages,
    /// Respond without waiting for metering to finish.
    pub detach_metering: bool,
    /// In-flight metering, drained on shutdown.
    pub metering_tasks: MeteringTasks,
}

impl WebhookAppState {
    pub fn metering_handler(&self) -> MeterCallUsageHandler {
        MeterCallUsageHandler::new(
            self.calls.clone(),
            self.subscriptions.clone(),
            self.usage_logs.clone(),
            Arc::new(WalletLedgerService::new(self.wallets.clone())),
            self.alerts.clone(),
            self.catalog.clone(),
        )
    }

    pub fn metering_dispatcher(&self) -> MeteringDispatcher {
        MeteringDispatcher::new(
            Arc::new(self.metering_handler()),
            self.alerts.clone(),
            self.metering_tasks.clone(),
            self.detach_metering,
        )
    }

    pub fn webhook_handler(&self) -> ProcessProviderEventHandler {
        let metering = Arc::new(self.metering_dispatcher());
        ProcessProviderEventHandler::new(
            self.verifier.clone(),
            AuthorizeCallHandler::new(
                self.tenants.clone(),
                self.subscriptions.clone(),
                self.wallets.clone(),
                self.catalog.clone(),
                self.messages.clone(),
            ),
            RecordCallStatusHandler::new(
                self.calls.clone(),
                self.tenants.clone(),
                metering.clone(),
            ),
            RecordEndOfCallHandler::new(self.calls.clone(), self.tenants.clone(), metering),
            AppendTranscriptHandler::new(self.calls.clone(), self.call_events.clone()),
            AuditFunctionCallHandler::new(
                self.tenants.clone(),
                self.calls.clone(),
                self.call_events.clone(),
            ),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/provider - Receive a provider event.
///
/// The body is taken as raw bytes; the signature covers those exact bytes.
pub async fn receive_provider_event(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookApiError> {
    let signature = headers
        .get(&state.signature_header)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let handler = state.webhook_handler();
    let cmd = ProcessProviderEventCommand {
        payload: body.to_vec(),
        signature,
    };

    let response = match handler.handle(cmd).await? {
        ProcessProviderEventResult::Assistant(directive) => {
            Json(AssistantResponse::from(directive)).into_response()
        }
        ProcessProviderEventResult::Acknowledged => Json(AcknowledgedResponse::new()).into_response(),
    };
    Ok(response)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, retryable = self.0.is_retryable(), "Webhook failed");
        }
        let body = ErrorResponse::new(self.0.code(), self.0.to_string());
        (status, Json(body)).into_response()
    }
}
