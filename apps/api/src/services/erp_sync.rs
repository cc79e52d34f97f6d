//! # Best-Effort ERP Sync
//!
//! Wraps gateway calls made after a local commit. The local write has
//! already succeeded by the time these run, so nothing here returns an
//! error: every outcome becomes an [`ErpSyncOutcome`] for the response.
//!
//! ```text
//! local commit ──► gateway enabled? ── no ──► skipped
//!                        │
//!                        ▼ yes
//!              tokio::time::timeout(limit, call)
//!                        │
//!          ┌─────────────┼──────────────┐
//!          ▼             ▼              ▼
//!       Ok(id)       Err(e)         elapsed
//!       synced       failed         failed (warn!)
//! ```

use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use tienda_erp::{ErpError, ErpGateway, ErpProduct, ErpResult, InvoiceDraft};

/// Reported to the client as `erp_sync`.
///
/// ```json
/// { "status": "synced", "erp_id": 42 }
/// { "status": "skipped" }
/// { "status": "failed", "error": "ERP no disponible" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ErpSyncOutcome {
    /// `erp_id` is the invoice id for sales, the product id for catalog.
    Synced { erp_id: i64 },
    Skipped,
    Failed { error: String },
}

impl ErpSyncOutcome {
    pub fn erp_id(&self) -> Option<i64> {
        match self {
            ErpSyncOutcome::Synced { erp_id } => Some(*erp_id),
            _ => None,
        }
    }
}

/// Creates a draft invoice, bounded by `limit`.
pub async fn push_invoice(
    gateway: &dyn ErpGateway,
    invoice: &InvoiceDraft,
    limit: Duration,
) -> ErpSyncOutcome {
    if !gateway.is_enabled() {
        return ErpSyncOutcome::Skipped;
    }
    bounded("invoice", limit, gateway.create_invoice(invoice)).await
}

/// Creates a catalog product, bounded by `limit`.
pub async fn push_product(
    gateway: &dyn ErpGateway,
    product: &ErpProduct,
    limit: Duration,
) -> ErpSyncOutcome {
    if !gateway.is_enabled() {
        return ErpSyncOutcome::Skipped;
    }
    bounded("product", limit, gateway.create_product(product)).await
}

async fn bounded<F>(what: &'static str, limit: Duration, call: F) -> ErpSyncOutcome
where
    F: Future<Output = ErpResult<i64>>,
{
    let result = match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ErpError::Timeout(limit)),
    };

    match result {
        Ok(erp_id) => {
            info!(what, erp_id, "ERP sync succeeded");
            ErpSyncOutcome::Synced { erp_id }
        }
        Err(ErpError::Disabled) => ErpSyncOutcome::Skipped,
        Err(e) => {
            warn!(what, error = %e, "ERP sync failed; local write kept");
            ErpSyncOutcome::Failed {
                error: client_message(&e).to_string(),
            }
        }
    }
}

/// Short, credential-free text for the client. Full details are in the log.
fn client_message(err: &ErpError) -> &'static str {
    match err {
        ErpError::Timeout(_) => "ERP no respondió a tiempo",
        ErpError::Unavailable(_) => "ERP no disponible",
        ErpError::Fault { .. } => "ERP rechazó la operación",
        ErpError::EmptyInvoice => "Factura sin líneas",
        ErpError::Disabled | ErpError::InvalidConfig(_) | ErpError::Protocol(_) => {
            "Error de integración con el ERP"
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
