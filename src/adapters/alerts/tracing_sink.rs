//! Alert sink that emits alerts as structured log events.
//!
//! Alerts are logged under the `callmeter::alert` target so log routing can
//! forward them to paging separately from ordinary application logs.

use async_trait::async_trait;

use crate::ports::{AlertSeverity, AlertSink, OperationalAlert};

/// Emits every alert through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl TracingAlertSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertSink for TracingAlertSink {
    async fn raise(&self, alert: OperationalAlert) {
        let company_id = alert.company_id.map(|id| id.to_string());
        match alert.severity {
            AlertSeverity::Critical => tracing::error!(
                target: "callmeter::alert",
                kind = ?alert.kind,
                company_id = company_id.as_deref(),
                provider_call_id = alert.provider_call_id.as_deref(),
                "{}",
                alert.message
            ),
            AlertSeverity::Warning => tracing::warn!(
                target: "callmeter::alert",
                kind = ?alert.kind,
                company_id = company_id.as_deref(),
                provider_call_id = alert.provider_call_id.as_deref(),
                "{}",
                alert.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AlertKind;

    #[tokio::test]
    async fn raising_without_subscriber_does_not_panic() {
        let sink = TracingAlertSink::new();
        sink.raise(OperationalAlert::critical(AlertKind::MeteringFailed, "boom").for_call("c1"))
            .await;
        sink.raise(OperationalAlert::warning(AlertKind::UnattributedCall, "who"))
            .await;
    }
}
