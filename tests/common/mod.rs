//! Shared wiring for integration tests: a full webhook pipeline over the
//! in-memory adapters.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::HeaderName;
use secrecy::SecretString;
use serde_json::{json, Value};

use callmeter::adapters::http::WebhookAppState;
use callmeter::adapters::memory::{
    InMemoryAlertSink, InMemoryCallEventRepository, InMemoryCallRepository,
    InMemorySubscriptionRepository, InMemoryTenantDirectory, InMemoryUsageLogRepository,
    InMemoryWalletRepository,
};
use callmeter::application::handlers::billing::{MeteringTasks, WalletLedgerService};
use callmeter::application::handlers::call::CallGateMessages;
use callmeter::domain::billing::{
    OverageRate, PlanCatalog, PlanId, Subscription, TransactionType, UsagePeriod, Wallet,
};
use callmeter::domain::call::TenantContext;
use callmeter::domain::foundation::{AgentId, CompanyId, PhoneNumber, Timestamp, UsagePeriodId};
use callmeter::domain::provider::{sign_payload, ProviderSignatureVerifier};

pub const SECRET: &str = "whsec_integration";
pub const SIGNATURE_HEADER: &str = "x-vapi-signature";
pub const TENANT_NUMBER: &str = "+15550000001";
pub const CALLER_NUMBER: &str = "+15559990000";
pub const DECLINE_MESSAGE: &str = "Service is paused for this line.";
pub const UNCONFIGURED_MESSAGE: &str = "This number is not in service.";

pub struct Harness {
    pub state: WebhookAppState,
    pub calls: Arc<InMemoryCallRepository>,
    pub events: Arc<InMemoryCallEventRepository>,
    pub tenants: Arc<InMemoryTenantDirectory>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub wallets: Arc<InMemoryWalletRepository>,
    pub usage_logs: Arc<InMemoryUsageLogRepository>,
    pub alerts: Arc<InMemoryAlertSink>,
    pub company: CompanyId,
}

/// Starter allowance of 240 minutes, $0.35 per overage minute.
pub fn catalog() -> PlanCatalog {
    PlanCatalog {
        starter_voice_minutes: 240,
        growth_voice_minutes: 2000,
        overage_rate: OverageRate::from_micros(350_000),
    }
}

impl Harness {
    /// Pipeline with metering awaited inline, so billing is observable as
    /// soon as the delivery returns.
    pub async fn new() -> Self {
        Self::with_catalog(catalog()).await
    }

    pub async fn with_catalog(catalog: PlanCatalog) -> Self {
        let calls = Arc::new(InMemoryCallRepository::new());
        let events = Arc::new(InMemoryCallEventRepository::new());
        let tenants = Arc::new(InMemoryTenantDirectory::new());
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let wallets = Arc::new(InMemoryWalletRepository::new());
        let usage_logs = Arc::new(InMemoryUsageLogRepository::new());
        let alerts = Arc::new(InMemoryAlertSink::new());

        let company = CompanyId::new();
        tenants
            .assign_number(
                PhoneNumber::new(TENANT_NUMBER).unwrap(),
                TenantContext {
                    company_id: company,
                    agent_id: AgentId::new(),
                },
                json!({"name": "Front desk", "firstMessage": "Thanks for calling!"}),
            )
            .await;

        let state = WebhookAppState {
            calls: calls.clone(),
            call_events: events.clone(),
            tenants: tenants.clone(),
            subscriptions: subscriptions.clone(),
            wallets: wallets.clone(),
            usage_logs: usage_logs.clone(),
            alerts: alerts.clone(),
            verifier: Arc::new(ProviderSignatureVerifier::new(Some(SecretString::new(
                SECRET.to_string(),
            )))),
            signature_header: HeaderName::from_static(SIGNATURE_HEADER),
            catalog,
            messages: CallGateMessages {
                decline_message: DECLINE_MESSAGE.to_string(),
                unconfigured_message: UNCONFIGURED_MESSAGE.to_string(),
            },
            detach_metering: false,
            metering_tasks: MeteringTasks::new(),
        };

        Self {
            state,
            calls,
            events,
            tenants,
            subscriptions,
            wallets,
            usage_logs,
            alerts,
            company,
        }
    }

    /// Active subscription with a current period already `used` minutes in.
    pub async fn subscribe(&self, plan: PlanId, used: u32) -> UsagePeriodId {
        let subscription = Subscription::active(self.company, plan);
        let now = Timestamp::now();
        let mut period =
            UsagePeriod::new(subscription.id, now.plus_days(-10), now.plus_days(20)).unwrap();
        period.voice_minutes_used = used;
        let period_id = period.id;
        self.subscriptions.insert_subscription(subscription).await;
        self.subscriptions.insert_period(period).await;
        period_id
    }

    pub fn ledger(&self) -> WalletLedgerService {
        WalletLedgerService::new(self.wallets.clone())
    }

    /// Opens an empty wallet and tops it up through the ledger, so the
    /// balance always has a matching transaction.
    pub async fn fund(&self, balance_cents: i64) -> Wallet {
        let wallet = Wallet::new(self.company);
        self.wallets.insert_wallet(wallet.clone()).await;
        if balance_cents > 0 {
            self.ledger()
                .credit(
                    wallet.id,
                    balance_cents,
                    TransactionType::TopUp,
                    None,
                    "Initial top-up",
                )
                .await
                .unwrap();
        }
        wallet
    }

    /// Asserts the wallet balance equals the sum of its transactions.
    pub async fn assert_reconciled(&self, wallet: &Wallet) {
        let reconciliation = self.ledger().reconcile(wallet.id).await.unwrap();
        assert!(
            reconciliation.is_balanced(),
            "wallet drifted by {} cents",
            reconciliation.drift_cents()
        );
    }
}

pub fn signed_body(event: &Value) -> (Vec<u8>, String) {
    let body = serde_json::to_vec(&json!({ "message": event })).unwrap();
    let signature = sign_payload(SECRET, &body);
    (body, signature)
}

pub fn assistant_request(call_id: &str) -> Value {
    json!({
        "type": "assistant-request",
        "call": {
            "id": call_id,
            "phoneNumber": {"number": TENANT_NUMBER},
            "customer": {"number": CALLER_NUMBER}
        }
    })
}

pub fn status_update(call_id: &str, status: &str) -> Value {
    json!({
        "type": "status-update",
        "status": status,
        "call": {
            "id": call_id,
            "phoneNumber": {"number": TENANT_NUMBER},
            "customer": {"number": CALLER_NUMBER}
        }
    })
}

pub fn end_of_call_report(call_id: &str, duration_seconds: u32, ended_reason: &str) -> Value {
    json!({
        "type": "end-of-call-report",
        "call": {
            "id": call_id,
            "phoneNumber": {"number": TENANT_NUMBER},
            "customer": {"number": CALLER_NUMBER}
        },
        "durationSeconds": duration_seconds,
        "endedReason": ended_reason,
        "transcript": "AI: Hello, how can I help?\nUser: I'd like to book a cleaning, thanks!",
        "summary": "Caller booked a cleaning.",
        "recordingUrl": "https://recordings.example/call.wav"
    })
}

/// Drops the dialed number from a delivery.
pub fn without_tenant_number(mut event: Value) -> Value {
    if let Some(call) = event.get_mut("call").and_then(Value::as_object_mut) {
        call.remove("phoneNumber");
    }
    event
}
