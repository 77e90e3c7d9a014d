//! RecordEndOfCallHandler - persists the final call report and triggers billing.
//!
//! The report may be the first event seen for a call, and it may be
//! delivered more than once. Report fields always overwrite the stored ones;
//! the lifecycle only moves forward. Metering is guarded separately so a
//! re-delivery never bills twice.

use std::sync::Arc;

use serde_json::Value;

use crate::application::handlers::billing::{
    MeterCallUsageCommand, MeterCallUsageResult, MeteringDispatcher,
};
use crate::domain::call::{
    classify_sentiment, Call, CallLifecycle, EndOfCallReport, Priority, Sentiment,
};
use crate::domain::foundation::{DomainError, PhoneNumber, ProviderCallId, Timestamp};
use crate::ports::{CallRepository, TenantResolver};

/// Command carrying a decoded end-of-call report.
#[derive(Debug, Clone)]
pub struct RecordEndOfCallCommand {
    pub provider_call_id: ProviderCallId,
    pub duration_seconds: u32,
    pub ended_reason: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub recording_url: Option<String>,
    pub cost_breakdown: Option<Value>,
    pub recipient_number: Option<PhoneNumber>,
    pub caller_number: Option<PhoneNumber>,
}

/// Result of recording a report.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEndOfCallResult {
    pub call: Call,
    pub sentiment: Sentiment,
    pub priority: Priority,
    /// Metering outcome; `None` when metering was detached or failed.
    pub metering: Option<MeterCallUsageResult>,
}

/// Handler for end-of-call reports.
pub struct RecordEndOfCallHandler {
    calls: Arc<dyn CallRepository>,
    tenants: Arc<dyn TenantResolver>,
    metering: Arc<MeteringDispatcher>,
}

impl RecordEndOfCallHandler {
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

    /// Records the report, tags the call and meters usage.
    ///
    /// # Errors
    ///
    /// Only failures to resolve the tenant or write the call record are
    /// returned. Tagging and metering failures are logged and alerted.
    pub async fn handle(
        &self,
        cmd: RecordEndOfCallCommand,
    ) -> Result<RecordEndOfCallResult, DomainError> {
        // 1. Tenant of the number the call was placed on. Only fills a
        //    missing attribution; metering bills the stored call's tenant.
        let tenant = match &cmd.recipient_number {
            Some(number) => self
                .tenants
                .resolve_by_phone_number(number)
                .await?
                .map(|a| a.tenant),
            None => None,
        };

        // 2. Upsert the report
        let outcome = CallLifecycle::from_ended_reason(cmd.ended_reason.as_deref());
        let report = EndOfCallReport {
            provider_call_id: cmd.provider_call_id,
            outcome,
            tenant,
            caller_number: cmd.caller_number,
            recipient_number: cmd.recipient_number,
            duration_seconds: cmd.duration_seconds,
            ended_reason: cmd.ended_reason,
            transcript: cmd.transcript,
            summary: cmd.summary,
            recording_url: cmd.recording_url,
            cost_breakdown: cmd.cost_breakdown,
        };
        let mut call = self.calls.upsert_report(&report).await?;

        tracing::info!(
            provider_call_id = %call.provider_call_id,
            lifecycle = call.lifecycle.as_str(),
            duration_seconds = report.duration_seconds,
            "End-of-call report recorded"
        );

        // 3. Sentiment and priority
        let sentiment = classify_sentiment(call.transcript.as_deref(), call.summary.as_deref());
        let priority = Priority::derive(call.lifecycle, sentiment);
        match self
            .calls
            .tag(&call.provider_call_id, sentiment, priority)
            .await
        {
            Ok(()) => call.tag(sentiment, priority, Timestamp::now()),
            Err(err) => tracing::warn!(
                provider_call_id = %call.provider_call_id,
                error = %err,
                "Failed to tag call sentiment"
            ),
        }

        // 4. Metering, on a tracked task that outlives this request
        let metering = self
            .metering
            .dispatch(MeterCallUsageCommand {
                provider_call_id: call.provider_call_id.clone(),
                company_id: call.company_id,
                duration_seconds: report.duration_seconds,
            })
            .await;

        Ok(RecordEndOfCallResult {
            call,
            sentiment,
            priority,
            metering,
        })
    }
}
