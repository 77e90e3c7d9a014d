//! MeteringDispatcher - runs metering on tracked tasks.
//!
//! Metering is always spawned onto a shared `TaskTracker` and never polled
//! inside the webhook request future. A request timeout or a dropped client
//! connection therefore cannot cut metering off between the billing claim
//! and the wallet debit. On shutdown the tracker is drained.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use crate::ports::{AlertKind, AlertSink, OperationalAlert};

use super::{MeterCallUsageCommand, MeterCallUsageHandler, MeterCallUsageResult};

/// Set of in-flight metering tasks, shared by every request.
#[derive(Clone, Default)]
pub struct MeteringTasks {
    tracker: TaskTracker,
}

impl MeteringTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(task)
    }

    /// Number of tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits for every spawned task to finish.
    ///
    /// Returns false if tasks were still running when `timeout` elapsed.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        if !drained {
            tracing::error!(
                in_flight = self.tracker.len(),
                "Metering tasks still running at shutdown"
            );
        }
        drained
    }
}

/// Hands metering commands to tracked tasks.
pub struct MeteringDispatcher {
    handler: Arc<MeterCallUsageHandler>,
    alerts: Arc<dyn AlertSink>,
    tasks: MeteringTasks,
    detach: bool,
}

impl MeteringDispatcher {
    pub fn new(
        handler: Arc<MeterCallUsageHandler>,
        alerts: Arc<dyn AlertSink>,
        tasks: MeteringTasks,
        detach: bool,
    ) -> Self {
        Self {
            handler,
            alerts,
            tasks,
            detach,
        }
    }

    /// Spawns metering and, unless detached, waits for its outcome.
    ///
    /// Returns `None` when detached or when metering failed. Failures are
    /// logged and raised as alerts inside the task. Dropping the returned
    /// future leaves the task running.
    pub async fn dispatch(&self, cmd: MeterCallUsageCommand) -> Option<MeterCallUsageResult> {
        let provider_call_id = cmd.provider_call_id.clone();
        let handler = self.handler.clone();
        let alerts = self.alerts.clone();
        let task = self
            .tasks
            .spawn(async move { run_metering(&handler, alerts.as_ref(), cmd).await });

        if self.detach {
            return None;
        }
        match task.await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(
                    provider_call_id = %provider_call_id,
                    error = %err,
                    "Metering task aborted"
                );
                None
            }
        }
    }
}

/// Runs metering, turning failures into alerts.
async fn run_metering(
    handler: &MeterCallUsageHandler,
    alerts: &dyn AlertSink,
    cmd: MeterCallUsageCommand,
) -> Option<MeterCallUsageResult> {
    let provider_call_id = cmd.provider_call_id.clone();
    let company_id = cmd.company_id;
    match handler.handle(cmd).await {
        Ok(result) => Some(result),
        Err(err) => {
            tracing::error!(
                provider_call_id = %provider_call_id,
                error = %err,
                "Usage metering failed"
            );
            let mut alert = OperationalAlert::critical(
                AlertKind::MeteringFailed,
                format!("Usage metering failed: {}", err),
            )
            .for_call(provider_call_id.as_str());
            if let Some(company_id) = company_id {
                alert = alert.for_company(company_id);
            }
            alerts.raise(alert).await;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAlertSink, InMemoryCallRepository, InMemorySubscriptionRepository,
        InMemoryUsageLogRepository, InMemoryWalletRepository,
    };
    use crate::application::handlers::billing::WalletLedgerService;
    use crate::domain::billing::{PlanCatalog, Wallet};
    use crate::domain::call::{CallLifecycle, EndOfCallReport};
    use crate::domain::foundation::{CompanyId, ProviderCallId};
    use crate::ports::{CallRepository, WalletRepository};

    struct Fixture {
        calls: Arc<InMemoryCallRepository>,
        wallets: Arc<InMemoryWalletRepository>,
        alerts: Arc<InMemoryAlertSink>,
        handler: Arc<MeterCallUsageHandler>,
        company: CompanyId,
    }

    impl Fixture {
        async fn new() -> Self {
            let calls = Arc::new(InMemoryCallRepository::new());
            let wallets = Arc::new(InMemoryWalletRepository::new());
            let alerts = Arc::new(InMemoryAlertSink::new());
            let company = CompanyId::new();
            let mut wallet = Wallet::new(company);
            wallet.balance_cents = 1_000;
            wallets.insert_wallet(wallet).await;
            let handler = Arc::new(MeterCallUsageHandler::new(
                calls.clone(),
                Arc::new(InMemorySubscriptionRepository::new()),
                Arc::new(InMemoryUsageLogRepository::new()),
                Arc::new(WalletLedgerService::new(wallets.clone())),
                alerts.clone(),
                PlanCatalog::default(),
            ));
            Self {
                calls,
                wallets,
                alerts,
                handler,
                company,
            }
        }

        fn dispatcher(&self, tasks: &MeteringTasks, detach: bool) -> MeteringDispatcher {
            MeteringDispatcher::new(
                self.handler.clone(),
                self.alerts.clone(),
                tasks.clone(),
                detach,
            )
        }

        async fn finished_call(&self, duration_seconds: u32) -> MeterCallUsageCommand {
            let provider_call_id = ProviderCallId::new("call-1").unwrap();
            self.calls
                .upsert_report(&EndOfCallReport {
                    provider_call_id: provider_call_id.clone(),
                    outcome: CallLifecycle::Resolved,
                    tenant: None,
                    caller_number: None,
                    recipient_number: None,
                    duration_seconds,
                    ended_reason: None,
                    transcript: None,
                    summary: None,
                    recording_url: None,
                    cost_breakdown: None,
                })
                .await
                .unwrap();
            MeterCallUsageCommand {
                provider_call_id,
                company_id: Some(self.company),
                duration_seconds,
            }
        }

        async fn balance(&self) -> i64 {
            self.wallets
                .find_by_company(&self.company)
                .await
                .unwrap()
                .unwrap()
                .balance_cents
        }
    }

    #[tokio::test]
    async fn inline_dispatch_returns_outcome() {
        let fx = Fixture::new().await;
        let tasks = MeteringTasks::new();
        let cmd = fx.finished_call(120).await;

        let result = fx.dispatcher(&tasks, false).dispatch(cmd).await;

        assert!(matches!(result, Some(MeterCallUsageResult::Metered(_))));
        assert_eq!(fx.balance().await, 930);
    }

    #[tokio::test]
    async fn detached_dispatch_completes_on_drain() {
        let fx = Fixture::new().await;
        let tasks = MeteringTasks::new();
        let cmd = fx.finished_call(120).await;

        let result = fx.dispatcher(&tasks, true).dispatch(cmd).await;
        assert_eq!(result, None);

        assert!(tasks.drain(Duration::from_secs(1)).await);
        assert_eq!(tasks.in_flight(), 0);
        assert_eq!(fx.balance().await, 930);
    }

    #[tokio::test]
    async fn dropped_caller_does_not_cancel_metering() {
        let fx = Fixture::new().await;
        let tasks = MeteringTasks::new();
        let cmd = fx.finished_call(120).await;
        let dispatcher = fx.dispatcher(&tasks, false);

        // Polled once, then dropped while waiting on the task.
        let outcome = tokio::time::timeout(Duration::ZERO, dispatcher.dispatch(cmd)).await;
        assert!(outcome.is_err());

        assert!(tasks.drain(Duration::from_secs(1)).await);
        assert_eq!(fx.balance().await, 930);
        assert!(fx.alerts.alerts().await.is_empty());
    }

    #[tokio::test]
    async fn drain_times_out_on_stuck_task() {
        let tasks = MeteringTasks::new();
        tasks.spawn(tokio::time::sleep(Duration::from_secs(5)));

        assert!(!tasks.drain(Duration::from_millis(10)).await);
        assert_eq!(tasks.in_flight(), 1);
    }
}
