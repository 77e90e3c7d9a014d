//! Billing configuration

use serde::Deserialize;

use crate::application::handlers::call::CallGateMessages;
use crate::domain::billing::{OverageRate, PlanCatalog};

use super::error::ValidationError;

/// Billing configuration (plan allowances, overage price, call gate)
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Overage price in dollars per voice minute
    #[serde(default = "default_overage_rate")]
    pub overage_rate_per_minute: f64,

    /// Monthly voice-minute allowance of the Starter plan
    #[serde(default = "default_starter_minutes")]
    pub starter_voice_minutes: u32,

    /// Monthly voice-minute allowance of the Growth plan
    #[serde(default = "default_growth_minutes")]
    pub growth_voice_minutes: u32,

    /// Spoken to callers when the tenant's wallet is empty
    #[serde(default = "default_decline_message")]
    pub decline_message: String,

    /// Spoken to callers when the number has no active agent
    #[serde(default = "default_unconfigured_message")]
    pub unconfigured_message: String,

    /// Meter on a spawned task instead of before the webhook response
    #[serde(default = "default_detach_metering")]
    pub detach_metering: bool,
}

impl BillingConfig {
    /// Plan catalog for the metering engine and spend guard
    pub fn to_catalog(&self) -> Result<PlanCatalog, ValidationError> {
        let overage_rate = OverageRate::from_dollars(self.overage_rate_per_minute)
            .map_err(|e| ValidationError::InvalidOverageRate(e.to_string()))?;
        Ok(PlanCatalog {
            starter_voice_minutes: self.starter_voice_minutes,
            growth_voice_minutes: self.growth_voice_minutes,
            overage_rate,
        })
    }

    /// Caller-facing messages for declined calls
    pub fn messages(&self) -> CallGateMessages {
        CallGateMessages {
            decline_message: self.decline_message.clone(),
            unconfigured_message: self.unconfigured_message.clone(),
        }
    }

    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.to_catalog()?;
        if self.decline_message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage("decline_message"));
        }
        if self.unconfigured_message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage("unconfigured_message"));
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            overage_rate_per_minute: default_overage_rate(),
            starter_voice_minutes: default_starter_minutes(),
            growth_voice_minutes: default_growth_minutes(),
            decline_message: default_decline_message(),
            unconfigured_message: default_unconfigured_message(),
            detach_metering: default_detach_metering(),
        }
    }
}

fn default_overage_rate() -> f64 {
    0.35
}

fn default_starter_minutes() -> u32 {
    600
}

fn default_growth_minutes() -> u32 {
    2000
}

fn default_decline_message() -> String {
    CallGateMessages::default().decline_message
}

fn default_unconfigured_message() -> String {
    CallGateMessages::default().unconfigured_message
}

fn default_detach_metering() -> bool {
    true
}
