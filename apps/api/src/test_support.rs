//! Shared fixtures for service and router tests.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use tienda_core::{Money, Product, ProductDraft};
use tienda_db::{Database, DbConfig};
use tienda_erp::{ErpError, ErpGateway, ErpProduct, ErpResult, InvoiceDraft};

use crate::state::AppState;

/// How the fake answers every call.
#[derive(Debug, Clone, Copy)]
pub enum FakeBehavior {
    Succeed(i64),
    Fail,
    /// Never answers; only a timeout ends the call.
    Hang,
}

/// ERP gateway that records what it was asked to create.
pub struct RecordingGateway {
    behavior: FakeBehavior,
    products: Mutex<Vec<ErpProduct>>,
    invoices: Mutex<Vec<InvoiceDraft>>,
}

impl RecordingGateway {
    pub fn new(behavior: FakeBehavior) -> Self {
        RecordingGateway {
            behavior,
            products: Mutex::new(Vec::new()),
            invoices: Mutex::new(Vec::new()),
        }
    }

    pub fn products(&self) -> Vec<ErpProduct> {
        self.products.lock().unwrap().clone()
    }

    pub fn invoices(&self) -> Vec<InvoiceDraft> {
        self.invoices.lock().unwrap().clone()
    }

    async fn answer(&self) -> ErpResult<i64> {
        match self.behavior {
            FakeBehavior::Succeed(id) => Ok(id),
            FakeBehavior::Fail => Err(ErpError::Unavailable("connection refused".to_string())),
            FakeBehavior::Hang => {
                std::future::pending::<()>().await;
                Err(ErpError::Protocol("unreachable".to_string()))
            }
        }
    }
}

#[async_trait]
impl ErpGateway for RecordingGateway {
    async fn create_product(&self, product: &ErpProduct) -> ErpResult<i64> {
        self.products.lock().unwrap().push(product.clone());
        self.answer().await
    }

    async fn create_invoice(&self, invoice: &InvoiceDraft) -> ErpResult<i64> {
        self.invoices.lock().unwrap().push(invoice.clone());
        self.answer().await
    }
}

/// 2026-03-14 10:00 in Lima.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap()
}

pub fn lima() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

pub async fn state_with(gateway: Arc<dyn ErpGateway>) -> AppState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    AppState::new(db, gateway, lima(), Duration::from_secs(8))
}

pub fn draft(name: &str, cost_cents: i64, price_cents: i64, stock: i64, min: i64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        unit_cost: Money::from_cents(cost_cents),
        sale_price: Money::from_cents(price_cents),
        current_stock: stock,
        min_stock: min,
    }
}

/// Inserts a product directly, optionally already linked to the ERP.
pub async fn seed_product(state: &AppState, draft: &ProductDraft, erp_id: Option<i64>) -> Product {
    let products = state.db.products();
    let mut product = products.insert(draft, now()).await.unwrap();
    if let Some(erp_id) = erp_id {
        products.set_erp_id(&product.id, erp_id).await.unwrap();
        product.erp_id = Some(erp_id);
    }
    product
}

/// Drives one request through the router and decodes the JSON reply.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
