//! Call aggregate.
//!
//! A `Call` is the single source of truth for one provider call. It is keyed by
//! the provider call ID, created at most once, updated by later webhook
//! deliveries and never deleted.
//!
//! # Design Decisions
//!
//! - **Upsert semantics**: every event may be the first one we see, so both
//!   status updates and end-of-call reports can create the record.
//! - **Monotonic lifecycle**: the stored state is merged, never assigned.
//! - **Report fields always win**: duration, transcript, summary, recording and
//!   cost from an end-of-call report overwrite whatever is stored.
//! - **Billing marker**: `billed_at` is set exactly once by the metering claim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CallLifecycle, Priority, Sentiment};
use crate::domain::foundation::{
    AgentId, CallId, CompanyId, PhoneNumber, ProviderCallId, StateMachine, Timestamp,
};

/// Tenant and agent a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub company_id: CompanyId,
    pub agent_id: AgentId,
}

/// A lifecycle change reported by a `status-update` event.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStatusUpdate {
    pub provider_call_id: ProviderCallId,
    pub lifecycle: CallLifecycle,
    pub tenant: Option<TenantContext>,
    pub caller_number: Option<PhoneNumber>,
    pub recipient_number: Option<PhoneNumber>,
}

/// The final report of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct EndOfCallReport {
    pub provider_call_id: ProviderCallId,
    /// Terminal state derived from the ended reason.
    pub outcome: CallLifecycle,
    pub tenant: Option<TenantContext>,
    pub caller_number: Option<PhoneNumber>,
    pub recipient_number: Option<PhoneNumber>,
    pub duration_seconds: u32,
    pub ended_reason: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub recording_url: Option<String>,
    /// Provider cost breakdown, stored verbatim.
    pub cost_breakdown: Option<Value>,
}

/// Call aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub id: CallId,
    pub provider_call_id: ProviderCallId,
    pub company_id: Option<CompanyId>,
    pub agent_id: Option<AgentId>,
    pub caller_number: Option<PhoneNumber>,
    pub recipient_number: Option<PhoneNumber>,
    pub lifecycle: CallLifecycle,
    pub duration_seconds: Option<u32>,
    pub ended_reason: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub recording_url: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub priority: Option<Priority>,
    pub cost_breakdown: Option<Value>,
    pub billed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Call {
    /// Creates an empty pending call for the given provider ID.
    pub fn pending(provider_call_id: ProviderCallId, now: Timestamp) -> Self {
        Self {
            id: CallId::new(),
            provider_call_id,
            company_id: None,
            agent_id: None,
            caller_number: None,
            recipient_number: None,
            lifecycle: CallLifecycle::Pending,
            duration_seconds: None,
            ended_reason: None,
            transcript: None,
            summary: None,
            recording_url: None,
            sentiment: None,
            priority: None,
            cost_breakdown: None,
            billed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a call from its first observed status update.
    pub fn from_status(update: &CallStatusUpdate, now: Timestamp) -> Self {
        let mut call = Self::pending(update.provider_call_id.clone(), now);
        call.apply_status(update, now);
        call
    }

    /// Creates a call from an end-of-call report seen before any status update.
    pub fn from_report(report: &EndOfCallReport, now: Timestamp) -> Self {
        let mut call = Self::pending(report.provider_call_id.clone(), now);
        call.apply_report(report, now);
        call
    }

    /// Applies a status update. Returns true if the lifecycle state changed.
    ///
    /// A terminal call keeps its state, but missing tenant and number fields
    /// are still filled in.
    pub fn apply_status(&mut self, update: &CallStatusUpdate, now: Timestamp) -> bool {
        self.fill_metadata(
            update.tenant,
            update.caller_number.as_ref(),
            update.recipient_number.as_ref(),
        );
        let next = self.lifecycle.merge(update.lifecycle);
        let changed = next != self.lifecycle;
        self.lifecycle = next;
        self.updated_at = now;
        changed
    }

    /// Applies an end-of-call report.
    pub fn apply_report(&mut self, report: &EndOfCallReport, now: Timestamp) {
        self.fill_metadata(
            report.tenant,
            report.caller_number.as_ref(),
            report.recipient_number.as_ref(),
        );
        self.lifecycle = self.lifecycle.merge(report.outcome);
        self.duration_seconds = Some(report.duration_seconds);
        self.ended_reason = report.ended_reason.clone();
        self.transcript = report.transcript.clone();
        self.summary = report.summary.clone();
        self.recording_url = report.recording_url.clone();
        self.cost_breakdown = report.cost_breakdown.clone();
        self.updated_at = now;
    }

    /// Stores the classifier output.
    pub fn tag(&mut self, sentiment: Sentiment, priority: Priority, now: Timestamp) {
        self.sentiment = Some(sentiment);
        self.priority = Some(priority);
        self.updated_at = now;
    }

    /// True once a report has landed, the tenant is known and nothing has
    /// been billed yet.
    pub fn awaiting_billing(&self) -> bool {
        self.lifecycle.is_terminal()
            && self.duration_seconds.is_some()
            && self.company_id.is_some()
            && self.billed_at.is_none()
    }

    /// Marks the call as billed. Returns false if it was billed before.
    pub fn claim_billing(&mut self, now: Timestamp) -> bool {
        if self.billed_at.is_some() {
            return false;
        }
        self.billed_at = Some(now);
        true
    }

    fn fill_metadata(
        &mut self,
        tenant: Option<TenantContext>,
        caller: Option<&PhoneNumber>,
        recipient: Option<&PhoneNumber>,
    ) {
        if let Some(tenant) = tenant {
            self.company_id.get_or_insert(tenant.company_id);
            self.agent_id.get_or_insert(tenant.agent_id);
        }
        if self.caller_number.is_none() {
            self.caller_number = caller.cloned();
        }
        if self.recipient_number.is_none() {
            self.recipient_number = recipient.cloned();
        }
    }
}
