//! Alert sink that keeps raised alerts in memory.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{AlertSink, OperationalAlert};

/// Collects alerts for inspection.
#[derive(Default)]
pub struct InMemoryAlertSink {
    alerts: RwLock<Vec<OperationalAlert>>,
}

impl InMemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all alerts raised so far.
    pub async fn alerts(&self) -> Vec<OperationalAlert> {
        self.alerts.read().await.clone()
    }
}

#[async_trait]
impl AlertSink for InMemoryAlertSink {
    async fn raise(&self, alert: OperationalAlert) {
        self.alerts.write().await.push(alert);
    }
}
