//! # Tienda API Server
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tracing subscriber (RUST_LOG, default info)                         │
//! │  2. AppConfig: defaults < tienda.toml < environment                     │
//! │  3. SQLite pool + migrations                                            │
//! │  4. ERP gateway: Odoo when fully configured, disabled otherwise         │
//! │  5. axum::serve until Ctrl+C / SIGTERM                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tienda_api::{build_router, AppConfig, AppState};
use tienda_db::{Database, DbConfig};
use tienda_erp::{DisabledGateway, ErpGateway, OdooGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting Tienda API server...");

    let config = AppConfig::load(None).context("loading configuration")?;
    let addr = config.socket_addr()?;
    let utc_offset = config.utc_offset()?;
    info!(
        %addr,
        database = %config.database.path.display(),
        utc_offset = %utc_offset,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(config.database.path.clone()).max_connections(config.database.max_connections),
    )
    .await
    .context("opening database")?;
    info!("Database ready");

    let erp: Arc<dyn ErpGateway> = match config.erp_config() {
        Some(erp_config) => {
            info!(url = %erp_config.url, database = %erp_config.database, "ERP integration enabled");
            Arc::new(OdooGateway::new(erp_config).context("configuring ERP gateway")?)
        }
        None => {
            warn!("ERP not configured, invoices and product sync will be skipped");
            Arc::new(DisabledGateway)
        }
    };

    let state = AppState::new(db.clone(), erp, utc_offset, config.erp_timeout());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
