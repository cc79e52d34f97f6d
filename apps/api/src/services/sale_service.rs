//! # Sale Registration
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    RegisterSale                                         │
//! │                                                                         │
//! │  SaleRequest { product_id, quantity, sale_type }                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────── one transaction ─────────────────────────┐  │
//! │  │  UPDATE stock WHERE current_stock >= qty                          │  │
//! │  │  INSERT sale header (total, profit)                               │  │
//! │  │  INSERT sale line (unit price after discount)                     │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │       │ committed                                                       │
//! │       ▼                                                                 │
//! │  product.erp_id? ── no ──► erp_sync: skipped                            │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  CreateInvoice (bounded) ──► erp_sync: synced | failed                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ERP step can never undo or fail the sale.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use tienda_core::report::local_date;
use tienda_core::{Money, SaleType};
use tienda_db::NewSale;
use tienda_erp::{InvoiceDraft, InvoiceLine};

use crate::error::ApiResult;
use crate::services::erp_sync::{push_invoice, ErpSyncOutcome};
use crate::state::AppState;

/// A parsed `POST /vender` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRequest {
    pub product_id: String,
    pub quantity: i64,
    pub sale_type: SaleType,
}

/// Response body of a registered sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleReceipt {
    pub mensaje: String,
    pub id: String,
    pub total: Money,
    pub ganancia: Money,
    pub erp_sync: ErpSyncOutcome,
}

pub async fn register_sale(
    state: &AppState,
    request: SaleRequest,
    now: DateTime<Utc>,
) -> ApiResult<SaleReceipt> {
    let recorded = state
        .db
        .sales()
        .record_sale(&NewSale {
            product_id: request.product_id,
            quantity: request.quantity,
            sale_type: request.sale_type,
            recorded_at: now,
        })
        .await?;

    let erp_sync = match recorded.product.erp_id {
        Some(erp_product_id) => {
            let invoice = InvoiceDraft {
                invoice_date: local_date(now, state.utc_offset),
                lines: vec![InvoiceLine {
                    erp_product_id,
                    quantity: recorded.line.quantity,
                    unit_price: recorded.line.unit_price,
                }],
            };
            push_invoice(state.erp.as_ref(), &invoice, state.erp_timeout).await
        }
        None => {
            debug!(product_id = %recorded.product.id, "Product not linked to ERP, invoice skipped");
            ErpSyncOutcome::Skipped
        }
    };

    Ok(SaleReceipt {
        mensaje: "Venta registrada".to_string(),
        id: recorded.sale.id,
        total: recorded.sale.total,
        ganancia: recorded.sale.profit,
        erp_sync,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{draft, now, seed_product, state_with, FakeBehavior, RecordingGateway};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tienda_erp::DisabledGateway;

    fn request(product_id: &str, quantity: i64, sale_type: SaleType) -> SaleRequest {
        SaleRequest {
            product_id: product_id.to_string(),
            quantity,
            sale_type,
        }
    }

    #[tokio::test]
    async fn test_retail_sale_invoices_linked_product() {
        let gateway = Arc::new(RecordingGateway::new(FakeBehavior::Succeed(900)));
        let state = state_with(gateway.clone()).await;
        let product = seed_product(&state, &draft("Leche Gloria 400g", 320, 450, 10, 2), Some(42)).await;

        let receipt = register_sale(&state, request(&product.id, 3, SaleType::Retail), now())
            .await
            .unwrap();

        assert_eq!(receipt.mensaje, "Venta registrada");
        assert_eq!(receipt.total, Money::from_cents(1350));
        assert_eq!(receipt.ganancia, Money::from_cents(390));
        assert_eq!(receipt.erp_sync, ErpSyncOutcome::Synced { erp_id: 900 });

        let invoices = gateway.invoices();
        assert_eq!(invoices.len(), 1);
        assert_eq!(
            invoices[0].invoice_date,
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
        );
        assert_eq!(invoices[0].lines.len(), 1);
        assert_eq!(invoices[0].lines[0].erp_product_id, 42);
        assert_eq!(invoices[0].lines[0].quantity, 3);
        assert_eq!(invoices[0].lines[0].unit_price, Money::from_cents(450));

        let after = state.db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.current_stock, 7);
    }

    #[tokio::test]
    async fn test_wholesale_invoice_carries_discounted_price() {
        let gateway = Arc::new(RecordingGateway::new(FakeBehavior::Succeed(1)));
        let state = state_with(gateway.clone()).await;
        let product = seed_product(&state, &draft("Aceite Primor 1L", 900, 1290, 20, 5), Some(7)).await;

        let receipt = register_sale(&state, request(&product.id, 10, SaleType::Wholesale), now())
            .await
            .unwrap();

        // 12.90 × 0.95 = 12.255
        assert_eq!(receipt.total, Money::parse("122.55").unwrap());
        assert_eq!(
            gateway.invoices()[0].lines[0].unit_price,
            Money::parse("12.255").unwrap()
        );
    }

    #[tokio::test]
    async fn test_unlinked_product_skips_erp() {
        let gateway = Arc::new(RecordingGateway::new(FakeBehavior::Succeed(1)));
        let state = state_with(gateway.clone()).await;
        let product = seed_product(&state, &draft("Pan francés", 10, 20, 100, 10), None).await;

        let receipt = register_sale(&state, request(&product.id, 5, SaleType::Retail), now())
            .await
            .unwrap();

        assert_eq!(receipt.erp_sync, ErpSyncOutcome::Skipped);
        assert!(gateway.invoices().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_gateway_skips_erp() {
        let state = state_with(Arc::new(DisabledGateway)).await;
        let product = seed_product(&state, &draft("Azúcar 1kg", 300, 420, 10, 2), Some(3)).await;

        let receipt = register_sale(&state, request(&product.id, 1, SaleType::Retail), now())
            .await
            .unwrap();
        assert_eq!(receipt.erp_sync, ErpSyncOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_erp_failure_keeps_the_sale() {
        let state = state_with(Arc::new(RecordingGateway::new(FakeBehavior::Fail))).await;
        let product = seed_product(&state, &draft("Fideos 500g", 200, 350, 10, 2), Some(8)).await;

        let receipt = register_sale(&state, request(&product.id, 2, SaleType::Retail), now())
            .await
            .unwrap();

        assert!(matches!(receipt.erp_sync, ErpSyncOutcome::Failed { .. }));
        assert!(state.db.sales().get_by_id(&receipt.id).await.unwrap().is_some());
        let after = state.db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.current_stock, 8);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let gateway = Arc::new(RecordingGateway::new(FakeBehavior::Succeed(1)));
        let state = state_with(gateway.clone()).await;
        let product = seed_product(&state, &draft("Atún Florida", 450, 650, 3, 1), Some(9)).await;

        let err = register_sale(&state, request(&product.id, 5, SaleType::Retail), now())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Stock insuficiente. Quedan 3");
        assert_eq!(state.db.sales().count().await.unwrap(), 0);
        assert!(gateway.invoices().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let state = state_with(Arc::new(DisabledGateway)).await;
        let err = register_sale(&state, request("nope", 1, SaleType::Retail), now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_overflowing_sale_is_rejected() {
        let gateway = Arc::new(RecordingGateway::new(FakeBehavior::Succeed(1)));
        let state = state_with(gateway.clone()).await;
        let mut gold = draft("Oro Fino", 100, 0, 2_000_000_000, 1);
        gold.sale_price = Money::parse("100000000000000000000").unwrap();
        let gold = seed_product(&state, &gold, Some(5)).await;

        let err = register_sale(&state, request(&gold.id, 1_000_000_000, SaleType::Retail), now())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "total is out of range");
        assert_eq!(state.db.sales().count().await.unwrap(), 0);
        assert!(gateway.invoices().is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_is_invalid() {
        let state = state_with(Arc::new(DisabledGateway)).await;
        let product = seed_product(&state, &draft("Sal 1kg", 100, 150, 10, 2), None).await;

        let err = register_sale(&state, request(&product.id, 0, SaleType::Retail), now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
