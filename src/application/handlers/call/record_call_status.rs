//! RecordCallStatusHandler - applies provider status updates to the call record.
//!
//! A status update arriving after the end-of-call report can still supply
//! the tenant. When that turns a reported call into a billable one, metering
//! runs from here.

use std::sync::Arc;

use crate::application::handlers::billing::{MeterCallUsageCommand, MeteringDispatcher};
use crate::domain::call::{Call, CallLifecycle, CallStatusUpdate};
use crate::domain::foundation::{DomainError, PhoneNumber, ProviderCallId};
use crate::ports::{CallRepository, TenantResolver};

/// Command to record a status update.
#[derive(Debug, Clone)]
pub struct RecordCallStatusCommand {
    pub provider_call_id: ProviderCallId,
    /// Raw provider status string.
    pub status: String,
    pub recipient_number: Option<PhoneNumber>,
    pub caller_number: Option<PhoneNumber>,
}

/// Result of recording a status update.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordCallStatusResult {
    /// Status not recognised; nothing written.
    Ignored { status: String },
    /// Call record after the upsert.
    Recorded(Call),
}

/// Handler for status updates.
///
/// Updates are applied through an idempotent upsert; the store never moves a
/// call backwards or out of a terminal state, so deliveries may arrive in any
/// order.
pub struct RecordCallStatusHandler {
    calls: Arc<dyn CallRepository>,
    tenants: Arc<dyn TenantResolver>,
    metering: Arc<MeteringDispatcher>,
}

impl RecordCallStatusHandler {
    pub fn new(
        calls: Arc<dyn CallRepository>,
        tenants: Arc<dyn TenantResolver>,
        metering: Arc<MeteringDispatcher>,
    ) -> Self {
        Self {
            calls,
            tenants,
            metering,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordCallStatusCommand,
    ) -> Result<RecordCallStatusResult, DomainError> {
        let Some(lifecycle) = CallLifecycle::from_provider_status(&cmd.status) else {
            tracing::warn!(
                provider_call_id = %cmd.provider_call_id,
                status = %cmd.status,
                "Unrecognised call status, ignoring"
            );
            return Ok(RecordCallStatusResult::Ignored { status: cmd.status });
        };

        let tenant = match &cmd.recipient_number {
            Some(number) => self
                .tenants
                .resolve_by_phone_number(number)
                .await?
                .map(|a| a.tenant),
            None => None,
        };

        let update = CallStatusUpdate {
            provider_call_id: cmd.provider_call_id,
            lifecycle,
            tenant,
            caller_number: cmd.caller_number,
            recipient_number: cmd.recipient_number,
        };
        let mut call = self.calls.upsert_status(&update).await?;

        if call.lifecycle != lifecycle {
            tracing::debug!(
                provider_call_id = %call.provider_call_id,
                incoming = lifecycle.as_str(),
                current = call.lifecycle.as_str(),
                "Status update did not advance call"
            );
        } else {
            tracing::info!(
                provider_call_id = %call.provider_call_id,
                lifecycle = call.lifecycle.as_str(),
                "Call status recorded"
            );
        }

        if update.tenant.is_some() && call.awaiting_billing() {
            tracing::info!(
                provider_call_id = %call.provider_call_id,
                "Reported call attributed late, metering"
            );
            let metered = self
                .metering
                .dispatch(MeterCallUsageCommand {
                    provider_call_id: call.provider_call_id.clone(),
                    company_id: call.company_id,
                    duration_seconds: call.duration_seconds.unwrap_or(0),
                })
                .await;
            if metered.is_some() {
                if let Some(billed) = self.calls.find_by_provider_id(&call.provider_call_id).await? {
                    call = billed;
                }
            }
        }

        Ok(RecordCallStatusResult::Recorded(call))
    }
}
