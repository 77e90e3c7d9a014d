//! AlertSink port - operational alerts for failures that must not fail a webhook.
//!
//! Billing runs after (or alongside) the provider response, so its failures
//! cannot be reported to the caller. They are raised here instead.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::CompanyId;

/// How urgently an operator must look at an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Overage is owed but the tenant has no wallet.
    WalletMissing,
    /// Metering failed after the call was claimed for billing.
    MeteringFailed,
    /// A finished call could not be attributed to a tenant.
    UnattributedCall,
}

/// An operational alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationalAlert {
    pub severity: AlertSeverity,
    pub kind: AlertKind,
    pub company_id: Option<CompanyId>,
    pub provider_call_id: Option<String>,
    pub message: String,
}

impl OperationalAlert {
    pub fn critical(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            severity: AlertSeverity::Critical,
            kind,
            company_id: None,
            provider_call_id: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            severity: AlertSeverity::Warning,
            ..Self::critical(kind, message)
        }
    }

    pub fn for_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn for_call(mut self, provider_call_id: impl Into<String>) -> Self {
        self.provider_call_id = Some(provider_call_id.into());
        self
    }
}

/// Port for raising operational alerts. Raising never fails.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn raise(&self, alert: OperationalAlert);
}
