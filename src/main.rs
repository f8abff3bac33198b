use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::{signal, sync::mpsc};
use tracing::{error, info, warn};

use printshop_api as api;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);
    let base_logger = api::logging::setup_logger(api::logging::LoggerConfig::default());

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }
    let db_arc = Arc::new(db_pool);

    // Init events
    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity.max(1));
    let event_sender = Arc::new(api::events::EventSender::new(event_tx));
    tokio::spawn(api::events::process_events(event_rx));

    // Aggregate app services used by HTTP handlers
    let services = api::handlers::AppServices::new(
        db_arc.clone(),
        &cfg,
        Some(event_sender.clone()),
        &base_logger,
    )?;

    let auth_service = Arc::new(api::auth::AuthService::new(
        api::auth::AuthConfig::from_app_config(&cfg),
        services.users.as_ref().clone(),
    ));

    if cfg.quickbooks.is_configured() && cfg.quickbooks.reconcile_interval_secs > 0 {
        spawn_invoice_reconciler(
            services.invoices.clone(),
            Duration::from_secs(cfg.quickbooks.reconcile_interval_secs),
            cfg.quickbooks.max_sync_attempts,
        );
    } else {
        info!("QuickBooks invoice reconciler disabled");
    }

    let cors_layer = match api::cors_layer(&cfg) {
        Some(layer) => {
            if !cfg.has_cors_allowed_origins() {
                info!(
                    "Using permissive CORS because explicit origins were not configured ({})",
                    if cfg.is_development() {
                        "development environment"
                    } else {
                        "explicit override enabled"
                    }
                );
            }
            layer
        }
        None => {
            error!("Missing CORS configuration detected; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
            return Err("Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true".into());
        }
    };

    // Compose shared app state
    let app_state = api::AppState {
        db: db_arc,
        config: cfg.clone(),
        event_sender,
        services,
    };

    let app = api::build_router(app_state, auth_service, cors_layer, &base_logger);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    info!("printshop-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically retries invoices whose QuickBooks push is pending or failed.
fn spawn_invoice_reconciler(
    invoices: Arc<api::services::invoices::InvoiceService>,
    every: Duration,
    max_attempts: i32,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick completes immediately; let startup settle.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match invoices.reconcile(max_attempts).await {
                Ok(summary) if summary.attempted > 0 => info!(
                    attempted = summary.attempted,
                    synced = summary.synced,
                    failed = summary.failed,
                    "Invoice reconcile pass finished"
                ),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Invoice reconcile pass failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
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
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
