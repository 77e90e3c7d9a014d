//! AuthorizeCallHandler - answers the provider's assistant request.
//!
//! Resolves the dialed number to a tenant, runs the spend guard and tells the
//! provider either to connect the tenant's agent or to speak a message and
//! hang up. No call record is written here; the call is tracked once status
//! updates arrive.

use std::sync::Arc;

use crate::domain::billing::{AssistantDirective, PlanCatalog, SpendDecision, SpendGuard};
use crate::domain::call::TenantContext;
use crate::domain::foundation::{DomainError, PhoneNumber, ProviderCallId};
use crate::ports::{SubscriptionRepository, TenantResolver, WalletRepository};

/// Messages spoken when a call is not connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallGateMessages {
    /// Spoken when the tenant cannot pay for the call.
    pub decline_message: String,
    /// Spoken when the dialed number has no active agent.
    pub unconfigured_message: String,
}

impl Default for CallGateMessages {
    fn default() -> Self {
        Self {
            decline_message: "We're sorry, this line is temporarily unavailable. Please try again later."
                .to_string(),
            unconfigured_message: "We're sorry, this number is not currently in service."
                .to_string(),
        }
    }
}

/// Command to authorize an inbound call.
#[derive(Debug, Clone)]
pub struct AuthorizeCallCommand {
    pub provider_call_id: Option<ProviderCallId>,
    pub recipient_number: Option<PhoneNumber>,
}

/// Result of authorizing a call.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizeCallResult {
    pub directive: AssistantDirective,
    /// Tenant that owns the number, when one was found.
    pub tenant: Option<TenantContext>,
    /// Spend guard outcome; `None` when the number was not configured.
    pub decision: Option<SpendDecision>,
}

/// Handler for assistant requests.
pub struct AuthorizeCallHandler {
    tenants: Arc<dyn TenantResolver>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    wallets: Arc<dyn WalletRepository>,
    catalog: PlanCatalog,
    messages: CallGateMessages,
}

impl AuthorizeCallHandler {
    pub fn new(
        tenants: Arc<dyn TenantResolver>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        wallets: Arc<dyn WalletRepository>,
        catalog: PlanCatalog,
        messages: CallGateMessages,
    ) -> Self {
        Self {
            tenants,
            subscriptions,
            wallets,
            catalog,
            messages,
        }
    }

    pub async fn handle(&self, cmd: AuthorizeCallCommand) -> Result<AuthorizeCallResult, DomainError> {
        let call_id = cmd.provider_call_id.as_ref().map(|id| id.as_str());

        // 1. Resolve the dialed number
        let assignment = match &cmd.recipient_number {
            Some(number) => self.tenants.resolve_by_phone_number(number).await?,
            None => None,
        };
        let Some(assignment) = assignment else {
            tracing::warn!(
                provider_call_id = call_id,
                recipient_number = cmd.recipient_number.as_ref().map(|n| n.as_str()),
                "Inbound call to unconfigured number"
            );
            return Ok(AuthorizeCallResult {
                directive: AssistantDirective::Decline {
                    message: self.messages.unconfigured_message.clone(),
                },
                tenant: None,
                decision: None,
            });
        };
        let tenant = assignment.tenant;

        // 2. Gather plan and balance
        let limits = self
            .subscriptions
            .find_active(&tenant.company_id)
            .await?
            .map(|s| self.catalog.limits_for(s.plan));
        let balance_cents = self
            .wallets
            .find_by_company(&tenant.company_id)
            .await?
            .map(|w| w.balance_cents);

        // 3. Gate
        let decision = SpendGuard::decide(limits.as_ref(), balance_cents);
        let directive = if decision.is_allowed() {
            tracing::info!(
                provider_call_id = call_id,
                company_id = %tenant.company_id,
                agent_id = %tenant.agent_id,
                "Inbound call authorized"
            );
            AssistantDirective::Connect {
                agent_config: assignment.agent_config,
            }
        } else {
            tracing::info!(
                provider_call_id = call_id,
                company_id = %tenant.company_id,
                balance_cents,
                "Inbound call declined, insufficient funds"
            );
            AssistantDirective::Decline {
                message: self.messages.decline_message.clone(),
            }
        };

        Ok(AuthorizeCallResult {
            directive,
            tenant: Some(tenant),
            decision: Some(decision),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemorySubscriptionRepository, InMemoryTenantDirectory, InMemoryWalletRepository,
    };
    use crate::domain::billing::{PlanId, Subscription, Wallet};
    use crate::domain::foundation::{AgentId, CompanyId};
    use serde_json::json;

    struct Fixture {
        handler: AuthorizeCallHandler,
        tenants: Arc<InMemoryTenantDirectory>,
        subscriptions: Arc<InMemorySubscriptionRepository>,
        wallets: Arc<InMemoryWalletRepository>,
        tenant: TenantContext,
        number: PhoneNumber,
    }

    impl Fixture {
        async fn new() -> Self {
            let tenants = Arc::new(InMemoryTenantDirectory::new());
            let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
            let wallets = Arc::new(InMemoryWalletRepository::new());
            let handler = AuthorizeCallHandler::new(
                tenants.clone(),
                subscriptions.clone(),
                wallets.clone(),
                PlanCatalog::default(),
                CallGateMessages::default(),
            );
            let tenant = TenantContext {
                company_id: CompanyId::new(),
                agent_id: AgentId::new(),
            };
            let number = PhoneNumber::new("+15550100").unwrap();
            tenants
                .assign_number(number.clone(), tenant, json!({"name": "Front desk"}))
                .await;
            Self {
                handler,
                tenants,
                subscriptions,
                wallets,
                tenant,
                number,
            }
        }

        fn command(&self) -> AuthorizeCallCommand {
            AuthorizeCallCommand {
                provider_call_id: Some(ProviderCallId::new("call-1").unwrap()),
                recipient_number: Some(self.number.clone()),
            }
        }

        async fn fund(&self, balance_cents: i64) {
            let mut wallet = Wallet::new(self.tenant.company_id);
            wallet.balance_cents = balance_cents;
            self.wallets.insert_wallet(wallet).await;
        }

        async fn subscribe(&self, plan: PlanId) {
            self.subscriptions
                .insert_subscription(Subscription::active(self.tenant.company_id, plan))
                .await;
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Allow
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn funded_tenant_gets_agent_config() {
        let fx = Fixture::new().await;
        fx.subscribe(PlanId::Starter).await;
        fx.fund(500).await;

        let result = fx.handler.handle(fx.command()).await.unwrap();

        assert_eq!(
            result.directive,
            AssistantDirective::Connect {
                agent_config: json!({"name": "Front desk"})
            }
        );
        assert_eq!(result.tenant, Some(fx.tenant));
        assert_eq!(
            result.decision,
            Some(SpendDecision::AllowFunded { balance_cents: 500 })
        );
    }

    #[tokio::test]
    async fn enterprise_tenant_connects_with_empty_wallet() {
        let fx = Fixture::new().await;
        fx.subscribe(PlanId::Enterprise).await;
        fx.fund(0).await;

        let result = fx.handler.handle(fx.command()).await.unwrap();

        assert_eq!(result.decision, Some(SpendDecision::AllowUnlimited));
        assert!(!result.directive.is_decline());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Decline
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn empty_wallet_is_declined_with_message() {
        let fx = Fixture::new().await;
        fx.subscribe(PlanId::Growth).await;
        fx.fund(0).await;

        let result = fx.handler.handle(fx.command()).await.unwrap();

        assert_eq!(
            result.directive,
            AssistantDirective::Decline {
                message: CallGateMessages::default().decline_message
            }
        );
        assert_eq!(result.decision, Some(SpendDecision::RejectInsufficientFunds));
    }

    #[tokio::test]
    async fn missing_wallet_is_declined() {
        let fx = Fixture::new().await;
        fx.subscribe(PlanId::Starter).await;

        let result = fx.handler.handle(fx.command()).await.unwrap();

        assert!(result.directive.is_decline());
    }

    #[tokio::test]
    async fn unassigned_number_gets_unconfigured_message() {
        let fx = Fixture::new().await;
        fx.tenants.unassign_number(&fx.number).await;

        let result = fx.handler.handle(fx.command()).await.unwrap();

        assert_eq!(
            result.directive,
            AssistantDirective::Decline {
                message: CallGateMessages::default().unconfigured_message
            }
        );
        assert_eq!(result.tenant, None);
        assert_eq!(result.decision, None);
    }

    #[tokio::test]
    async fn request_without_number_is_unconfigured() {
        let fx = Fixture::new().await;
        let mut cmd = fx.command();
        cmd.recipient_number = None;

        let result = fx.handler.handle(cmd).await.unwrap();

        assert!(result.directive.is_decline());
        assert_eq!(result.tenant, None);
    }
}
