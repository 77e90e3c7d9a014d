//! Write-once analytics record of a billable event.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{PlanId, UsageCharge};
use crate::domain::foundation::{CompanyId, ProviderCallId, Timestamp};

/// Resource a usage log entry measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    VoiceMinutes,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::VoiceMinutes => "voice_minutes",
        }
    }
}

/// One billable event. Unique per `(reference_id, resource_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLog {
    pub id: Uuid,
    pub company_id: CompanyId,
    pub resource_type: ResourceType,
    pub reference_id: String,
    pub quantity: u32,
    pub cost_cents: i64,
    pub metadata: Value,
    pub created_at: Timestamp,
}

impl UsageLog {
    /// Builds the voice-minute log entry for a metered call.
    pub fn for_call(
        company_id: CompanyId,
        provider_call_id: &ProviderCallId,
        duration_seconds: u32,
        plan: Option<PlanId>,
        charge: &UsageCharge,
        wallet_debited: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            resource_type: ResourceType::VoiceMinutes,
            reference_id: provider_call_id.as_str().to_string(),
            quantity: charge.call_minutes,
            cost_cents: charge.overage_cost_cents,
            metadata: json!({
                "provider_call_id": provider_call_id.as_str(),
                "duration_seconds": duration_seconds,
                "covered_minutes": charge.covered_minutes,
                "overage_minutes": charge.overage_minutes,
                "plan_id": plan.map(|p| p.as_str()),
                "basis": charge.basis,
                "wallet_debited": wallet_debited,
            }),
            created_at: Timestamp::now(),
        }
    }
}
