//! Provider webhook HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{AcknowledgedResponse, AssistantResponse, ErrorResponse};
pub use handlers::{receive_provider_event, WebhookApiError, WebhookAppState};
pub use routes::{webhook_router, webhook_routes};
