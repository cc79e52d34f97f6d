//! # Product Endpoints
//!
//! ## Wire Shape
//! ```json
//! {
//!   "id": "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d",
//!   "odoo_id": 42,
//!   "nombre": "Leche Gloria 400g",
//!   "costo_unitario": "3.20",
//!   "precio_venta": "4.50",
//!   "stock_actual": 24,
//!   "stock_minimo": 6,
//!   "stock_bajo": false
//! }
//! ```
//!
//! Money is accepted as a string or a JSON number on input.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tienda_core::{Money, Product, ProductDraft};

use crate::error::ApiResult;
use crate::routes::json_body;
use crate::services::catalog_service;
use crate::services::erp_sync::ErpSyncOutcome;
use crate::state::AppState;

/// Product as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDto {
    pub id: String,
    pub odoo_id: Option<i64>,
    pub nombre: String,
    pub costo_unitario: Money,
    pub precio_venta: Money,
    pub stock_actual: i64,
    pub stock_minimo: i64,
    pub stock_bajo: bool,
    pub creado: DateTime<Utc>,
    pub actualizado: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            stock_bajo: p.is_low_stock(),
            id: p.id,
            odoo_id: p.erp_id,
            nombre: p.name,
            costo_unitario: p.unit_cost,
            precio_venta: p.sale_price,
            stock_actual: p.current_stock,
            stock_minimo: p.min_stock,
            creado: p.created_at,
            actualizado: p.updated_at,
        }
    }
}

/// Create/update body. Unknown fields such as `id` or `odoo_id` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub nombre: String,
    pub costo_unitario: Money,
    pub precio_venta: Money,
    pub stock_actual: i64,
    pub stock_minimo: i64,
}

impl From<ProductInput> for ProductDraft {
    fn from(input: ProductInput) -> Self {
        ProductDraft {
            name: input.nombre,
            unit_cost: input.costo_unitario,
            sale_price: input.precio_venta,
            current_stock: input.stock_actual,
            min_stock: input.stock_minimo,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedProduct {
    pub producto: ProductDto,
    pub erp_sync: ErpSyncOutcome,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = catalog_service::list_products(&state).await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductDto>> {
    let product = catalog_service::get_product(&state, &id).await?;
    Ok(Json(product.into()))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedProduct>)> {
    let input = json_body(payload)?;
    let (product, erp_sync) =
        catalog_service::create_product(&state, input.into(), Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedProduct {
            producto: product.into(),
            erp_sync,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Json<ProductDto>> {
    let input = json_body(payload)?;
    let product = catalog_service::update_product(&state, &id, input.into(), Utc::now()).await?;
    Ok(Json(product.into()))
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::{send, state_with, FakeBehavior, RecordingGateway};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn body() -> serde_json::Value {
        json!({
            "nombre": "Leche Gloria 400g",
            "costo_unitario": "3.20",
            "precio_venta": 4.5,
            "stock_actual": 24,
            "stock_minimo": 6
        })
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let state = state_with(Arc::new(RecordingGateway::new(FakeBehavior::Succeed(42)))).await;
        let app = crate::build_router(state);

        let (status, created) = send(&app, "POST", "/productos", Some(body().to_string())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["producto"]["nombre"], "Leche Gloria 400g");
        assert_eq!(created["producto"]["precio_venta"], "4.50");
        assert_eq!(created["producto"]["odoo_id"], 42);
        assert_eq!(created["erp_sync"], json!({"status": "synced", "erp_id": 42}));

        let id = created["producto"]["id"].as_str().unwrap();
        let (status, fetched) = send(&app, "GET", &format!("/productos/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["stock_actual"], 24);
        assert_eq!(fetched["stock_bajo"], false);

        let (status, listed) = send(&app, "GET", "/productos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_restocks() {
        let state = state_with(Arc::new(RecordingGateway::new(FakeBehavior::Fail))).await;
        let app = crate::build_router(state);

        let (_, created) = send(&app, "POST", "/productos", Some(body().to_string())).await;
        assert_eq!(created["erp_sync"]["status"], "failed");
        let id = created["producto"]["id"].as_str().unwrap();

        let mut restock = body();
        restock["stock_actual"] = json!(100);
        let (status, updated) =
            send(&app, "PUT", &format!("/productos/{}", id), Some(restock.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["stock_actual"], 100);
    }

    #[tokio::test]
    async fn test_errors() {
        let state = state_with(Arc::new(RecordingGateway::new(FakeBehavior::Fail))).await;
        let app = crate::build_router(state);

        let (status, err) = send(&app, "GET", "/productos/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["code"], "NOT_FOUND");
        assert_eq!(err["error"], "El producto no existe");

        let mut negative = body();
        negative["precio_venta"] = json!("-1");
        let (status, err) = send(&app, "POST", "/productos", Some(negative.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "VALIDATION_ERROR");

        let mut overpriced = body();
        overpriced["precio_venta"] = json!("100000000000000000000");
        let (status, err) = send(&app, "POST", "/productos", Some(overpriced.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "precio_venta is out of range");

        let (status, err) = send(&app, "POST", "/productos", Some("{\"nombre\":".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].is_string());
    }
}
