//! MeterCallUsageHandler - exactly-once usage accounting for a finished call.
//!
//! Runs once per end-of-call report:
//!
//! 1. Skip calls with zero duration or no tenant
//! 2. Claim the call for billing (only one delivery wins)
//! 3. Compute covered and overage minutes against the active plan
//! 4. Add the full call minutes to the current usage period
//! 5. Debit the wallet for overage
//! 6. Write one usage log entry
//!
//! A missing wallet is raised as an alert and recorded in the usage log
//! metadata; it never aborts metering. A metering future dropped after the
//! claim raises a critical alert from its drop guard.

use std::sync::Arc;

use crate::domain::billing::{
    billable_minutes, BillingError, PlanCatalog, PlanId, UsageCharge, UsageLog,
};
use crate::domain::foundation::{CompanyId, ProviderCallId, Timestamp};
use crate::ports::{
    AlertKind, AlertSink, CallRepository, OperationalAlert, SaveResult, SubscriptionRepository,
    UsageLogRepository,
};

use super::WalletLedgerService;

/// Command to meter a finished call.
#[derive(Debug, Clone)]
pub struct MeterCallUsageCommand {
    pub provider_call_id: ProviderCallId,
    pub company_id: Option<CompanyId>,
    pub duration_seconds: u32,
}

/// What metering did.
#[derive(Debug, Clone, PartialEq)]
pub enum MeterCallUsageResult {
    /// Zero-length call; nothing to bill.
    SkippedZeroDuration,
    /// Call has no tenant; nothing can be billed.
    Unattributed,
    /// Another delivery already metered this call.
    AlreadyBilled,
    Metered(MeteringReceipt),
}

/// Details of a metered call.
#[derive(Debug, Clone, PartialEq)]
pub struct MeteringReceipt {
    pub charge: UsageCharge,
    pub plan: Option<PlanId>,
    /// New period total, when a usage period was updated.
    pub voice_minutes_used: Option<u32>,
    pub wallet_debited: bool,
    pub balance_after_cents: Option<i64>,
}

/// Handler for metering call usage.
pub struct MeterCallUsageHandler {
    calls: Arc<dyn CallRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    usage_logs: Arc<dyn UsageLogRepository>,
    ledger: Arc<WalletLedgerService>,
    alerts: Arc<dyn AlertSink>,
    catalog: PlanCatalog,
}

impl MeterCallUsageHandler {
    pub fn new(
        calls: Arc<dyn CallRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        usage_logs: Arc<dyn UsageLogRepository>,
        ledger: Arc<WalletLedgerService>,
        alerts: Arc<dyn AlertSink>,
        catalog: PlanCatalog,
    ) -> Self {
        Self {
            calls,
            subscriptions,
            usage_logs,
            ledger,
            alerts,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        cmd: MeterCallUsageCommand,
    ) -> Result<MeterCallUsageResult, BillingError> {
        let call_id = cmd.provider_call_id.as_str();

        // 1. Nothing to bill
        if cmd.duration_seconds == 0 {
            tracing::debug!(provider_call_id = call_id, "Zero-duration call, skipping metering");
            return Ok(MeterCallUsageResult::SkippedZeroDuration);
        }
        let Some(company_id) = cmd.company_id else {
            tracing::warn!(provider_call_id = call_id, "Finished call has no tenant, not metered");
            self.alerts
                .raise(
                    OperationalAlert::warning(
                        AlertKind::UnattributedCall,
                        "Finished call could not be attributed to a tenant",
                    )
                    .for_call(call_id),
                )
                .await;
            return Ok(MeterCallUsageResult::Unattributed);
        };

        // 2. Exactly-once guard
        if !self.calls.claim_billing(&cmd.provider_call_id).await? {
            tracing::debug!(provider_call_id = call_id, "Call already billed, skipping");
            return Ok(MeterCallUsageResult::AlreadyBilled);
        }
        let claim = ClaimGuard {
            alerts: self.alerts.clone(),
            provider_call_id: cmd.provider_call_id.clone(),
            company_id,
            settled: false,
        };
        let result = self.meter_claimed(company_id, &cmd).await;
        claim.settle();
        result
    }

    /// Steps 3 to 6; runs only for the delivery that won the claim.
    async fn meter_claimed(
        &self,
        company_id: CompanyId,
        cmd: &MeterCallUsageCommand,
    ) -> Result<MeterCallUsageResult, BillingError> {
        let call_id = cmd.provider_call_id.as_str();

        // 3. Charge against the active plan
        let minutes = billable_minutes(cmd.duration_seconds);
        let subscription = self.subscriptions.find_active(&company_id).await?;
        let limits = subscription
            .as_ref()
            .map(|s| self.catalog.limits_for(s.plan));
        let period = match &subscription {
            Some(sub) => {
                self.subscriptions
                    .find_current_period(&sub.id, Timestamp::now())
                    .await?
            }
            None => None,
        };
        let charge = UsageCharge::compute(
            minutes,
            limits.as_ref(),
            period.as_ref(),
            self.catalog.overage_rate,
        );
        let plan = limits.map(|l| l.plan);

        // 4. Usage counter
        let voice_minutes_used = match &period {
            Some(period) => Some(
                self.subscriptions
                    .increment_voice_minutes(&period.id, minutes)
                    .await?,
            ),
            None => None,
        };

        // 5. Overage debit
        let mut wallet_debited = false;
        let mut balance_after_cents = None;
        if charge.has_overage() {
            let description = overage_description(&charge, plan, call_id);
            match self
                .ledger
                .debit_company(
                    company_id,
                    charge.overage_cost_cents,
                    Some(call_id.to_string()),
                    description,
                )
                .await
            {
                Ok(entry) => {
                    wallet_debited = true;
                    balance_after_cents = Some(entry.balance_after_cents);
                }
                Err(BillingError::WalletNotFound(_)) => {
                    tracing::error!(
                        provider_call_id = call_id,
                        company_id = %company_id,
                        overage_cost_cents = charge.overage_cost_cents,
                        "Overage owed but tenant has no wallet"
                    );
                    self.alerts
                        .raise(
                            OperationalAlert::critical(
                                AlertKind::WalletMissing,
                                format!(
                                    "Overage of {} cents owed but no wallet exists",
                                    charge.overage_cost_cents
                                ),
                            )
                            .for_company(company_id)
                            .for_call(call_id),
                        )
                        .await;
                }
                Err(err) => return Err(err),
            }
        }

        // 6. Usage log
        let log = UsageLog::for_call(
            company_id,
            &cmd.provider_call_id,
            cmd.duration_seconds,
            plan,
            &charge,
            wallet_debited,
        );
        if self.usage_logs.save(&log).await? == SaveResult::AlreadyExists {
            tracing::debug!(provider_call_id = call_id, "Usage log already recorded");
        }

        tracing::info!(
            provider_call_id = call_id,
            company_id = %company_id,
            call_minutes = charge.call_minutes,
            covered_minutes = charge.covered_minutes,
            overage_minutes = charge.overage_minutes,
            overage_cost_cents = charge.overage_cost_cents,
            wallet_debited,
            "Call metered"
        );

        Ok(MeterCallUsageResult::Metered(MeteringReceipt {
            charge,
            plan,
            voice_minutes_used,
            wallet_debited,
            balance_after_cents,
        }))
    }
}

/// Raises an alert if a claimed call is dropped before metering returns.
///
/// The claim cannot be retried once `billed_at` is set.
struct ClaimGuard {
    alerts: Arc<dyn AlertSink>,
    provider_call_id: ProviderCallId,
    company_id: CompanyId,
    settled: bool,
}

impl ClaimGuard {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::error!(
            provider_call_id = %self.provider_call_id,
            company_id = %self.company_id,
            "Metering cancelled after the call was claimed for billing"
        );
        let alert = OperationalAlert::critical(
            AlertKind::MeteringFailed,
            "Metering cancelled after the call was claimed for billing",
        )
        .for_company(self.company_id)
        .for_call(self.provider_call_id.as_str());
        let alerts = self.alerts.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move { alerts.raise(alert).await });
        }
    }
}

fn overage_description(charge: &UsageCharge, plan: Option<PlanId>, call_id: &str) -> String {
    match plan {
        Some(plan) => format!(
            "Voice overage: {} min beyond {} plan allowance (call {})",
            charge.overage_minutes, plan, call_id
        ),
        None => format!(
            "Voice usage: {} min without active plan (call {})",
            charge.overage_minutes, call_id
        ),
    }
}
