use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use callmeter::adapters::postgres::{
    PostgresCallEventRepository, PostgresCallRepository, PostgresSubscriptionRepository,
    PostgresTenantResolver, PostgresUsageLogRepository, PostgresWalletRepository,
};
use callmeter::adapters::{webhook_router, TracingAlertSink, WebhookAppState};
use callmeter::application::handlers::billing::MeteringTasks;
use callmeter::config::{AppConfig, LogFormat, ServerConfig};
use callmeter::domain::provider::ProviderSignatureVerifier;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.server)?;
    config.validate()?;

    let addr = config.server.socket_addr()?;
    info!(
        %addr,
        environment = ?config.server.environment,
        detach_metering = config.billing.detach_metering,
        "starting callmeter"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    info!("Postgres connection has been established");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database migrations applied");
    }

    let verifier = ProviderSignatureVerifier::new(config.provider.webhook_secret.clone());
    if !verifier.is_enforcing() {
        warn!("no webhook secret configured, provider signatures will not be verified");
    }

    let metering_tasks = MeteringTasks::new();
    let state = WebhookAppState {
        calls: Arc::new(PostgresCallRepository::new(pool.clone())),
        call_events: Arc::new(PostgresCallEventRepository::new(pool.clone())),
        tenants: Arc::new(PostgresTenantResolver::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        wallets: Arc::new(PostgresWalletRepository::new(pool.clone())),
        usage_logs: Arc::new(PostgresUsageLogRepository::new(pool.clone())),
        alerts: Arc::new(TracingAlertSink::new()),
        verifier: Arc::new(verifier),
        signature_header: config.provider.signature_header_name()?,
        catalog: config.billing.to_catalog()?,
        messages: config.billing.messages(),
        detach_metering: config.billing.detach_metering,
        metering_tasks: metering_tasks.clone(),
    };
    let router = webhook_router(state, config.server.request_timeout());

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening for provider webhooks");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(in_flight = metering_tasks.in_flight(), "waiting for metering to finish");
    if !metering_tasks.drain(config.server.shutdown_grace()).await {
        warn!("shutdown grace period elapsed with metering still running");
    }

    pool.close().await;
    info!("callmeter shut down");
    Ok(())
}

fn init_tracing(server: &ServerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let builder = fmt().with_env_filter(filter);
    match server.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl+c, draining in-flight webhooks"),
        _ = terminate => info!("received SIGTERM, draining in-flight webhooks"),
    }
}
