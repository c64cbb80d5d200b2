//! # driphubd — driphub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`driphub.toml` + `DRIPHUB_*` env overrides)
//! - Initialize the `SQLite` pool and run migrations
//! - Construct the engine, ingestor, executor and scheduler
//! - Select gateways (HTTP email when configured, virtual otherwise)
//! - Spawn the MQTT consumer (when enabled) and the sweep loop
//! - Serve the admin API and handle graceful shutdown (SIGINT/SIGTERM)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::watch;

use config::Config;
use driphub_adapter_email_reqwest::HttpEmailGateway;
use driphub_adapter_http_axum::state::AppState;
use driphub_adapter_mqtt::EventConsumer;
use driphub_adapter_storage_sqlite_sqlx::{SqliteActionStore, SqliteAutomationRepository};
use driphub_adapter_virtual::seed::seed_presets;
use driphub_adapter_virtual::{VirtualAdsGateway, VirtualNotificationGateway};
use driphub_app::action_executor::ActionExecutor;
use driphub_app::action_scheduler::ActionScheduler;
use driphub_app::automation_engine::AutomationEngine;
use driphub_app::event_bus::InProcessEngineBus;
use driphub_app::event_ingestor::EventIngestor;
use driphub_app::ports::{NotificationGateway, ProviderError};
use driphub_app::services::automation_service::AutomationService;
use driphub_app::services::sequence_service::SequenceService;
use driphub_domain::id::ActionId;

/// The notification gateway the executor sends through, selected at
/// startup: a real HTTP provider when email is configured, the
/// recording virtual gateway otherwise.
enum Notifier {
    Email(HttpEmailGateway),
    Virtual(VirtualNotificationGateway),
}

impl NotificationGateway for Notifier {
    async fn send_email(
        &self,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> Result<(), ProviderError> {
        match self {
            Self::Email(gateway) => {
                gateway.send_email(recipient, template_id, data, dedupe_key).await
            }
            Self::Virtual(gateway) => {
                gateway.send_email(recipient, template_id, data, dedupe_key).await
            }
        }
    }

    async fn send_sms(
        &self,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> Result<(), ProviderError> {
        match self {
            Self::Email(gateway) => {
                gateway.send_sms(recipient, template_id, data, dedupe_key).await
            }
            Self::Virtual(gateway) => {
                gateway.send_sms(recipient, template_id, data, dedupe_key).await
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.filter.as_str())
        .init();

    // Database
    let db = config.database.clone().build().await?;
    let pool = db.pool().clone();

    // Repositories
    let automation_repo = Arc::new(SqliteAutomationRepository::new(pool.clone()));
    let action_store = Arc::new(SqliteActionStore::new(pool));

    // Engine bus
    let engine_bus = Arc::new(InProcessEngineBus::new(256));

    // Engine + ingestor
    let engine = Arc::new(AutomationEngine::new(
        automation_repo.clone(),
        action_store.clone(),
        engine_bus.clone(),
    ));
    let ingestor = Arc::new(EventIngestor::new(engine.clone(), engine_bus.clone()));

    // Gateways
    let notifications = Arc::new(if config.email.is_configured() {
        tracing::info!(provider = %config.email.provider, "sending email through the configured provider");
        Notifier::Email(HttpEmailGateway::new(config.email.clone())?)
    } else {
        tracing::info!("email not configured, recording notifications in the virtual gateway");
        Notifier::Virtual(VirtualNotificationGateway::default())
    });
    let audiences = Arc::new(VirtualAdsGateway::default());

    // Scheduler
    let executor = ActionExecutor::new(
        action_store.clone(),
        notifications,
        audiences,
        engine_bus.clone(),
        config.scheduler.retry_policy(),
    );
    let scheduler = ActionScheduler::new(
        action_store.clone(),
        executor,
        config.scheduler.sweep_config(),
    );

    // Demo seeding
    if config.demo.seed {
        let merchant_id = config.demo_merchant()?;
        let seeded = seed_presets(automation_repo.as_ref(), merchant_id).await?;
        tracing::info!(count = seeded, %merchant_id, "demo presets seeded");
    }

    // Background tasks
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = config.mqtt.enabled.then(|| {
        EventConsumer::new(&config.mqtt.connection, ingestor.clone()).start(shutdown_rx.clone())
    });
    drop(shutdown_rx);
    let scheduler_handle = scheduler.start();

    // HTTP
    let state = AppState::new(
        Arc::new(AutomationService::new(automation_repo)),
        Arc::new(SequenceService::new(action_store)),
        engine,
        ingestor,
    );
    let app = driphub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "driphubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("shutdown signal received, draining");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    if let Some(handle) = consumer {
        let _ = handle.await;
    }
    scheduler_handle.abort();

    Ok(())
}

/// Resolve when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(%err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                tracing::warn!(%err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
