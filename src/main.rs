use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wcrm_bridge::{AppConfig, AppState, WcrmApi, WcrmClient, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("failed to load application configuration")?;

    let api: Option<Arc<dyn WcrmApi>> = match config.api_key.as_deref() {
        Some(key) => {
            let client = WcrmClient::new(&config.api_base_url, key, config.http_timeout)
                .context("failed to build wCRM API client")?;
            info!(base_url = %client.base_url(), "outbound wCRM API enabled");
            let client: Arc<dyn WcrmApi> = Arc::new(client);
            Some(client)
        }
        None => {
            warn!("WCRM_API_KEY is not set, outbound sends are disabled");
            None
        }
    };

    let settings = config.webhook_settings();
    info!(
        path = %settings.path,
        store_messages = settings.store_messages,
        max_stored_messages = settings.max_stored_messages,
        "webhook configured"
    );

    let app = build_router(AppState::build(settings, api));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "wcrm bridge started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "wcrm_bridge=debug,tower_http=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it.
async fn shutdown_signal() {
    let reason = wait_for_signal().await;
    info!(signal = reason, "shutting down, draining in-flight requests");
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(err) => {
            warn!(error = %err, "SIGTERM unavailable, waiting for Ctrl+C only");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        reason = ctrl_c() => reason,
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // Without a handler the server only stops on SIGTERM or a kill.
        error!(error = %err, "unable to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    "Ctrl+C"
}
