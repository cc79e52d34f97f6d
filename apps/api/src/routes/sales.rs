//! # Sale Endpoints
//!
//! ## Registering a Sale
//! ```text
//! POST /vender { "producto_id": "...", "cantidad": 3, "tipo": "MAYOR" }
//!      │
//!      ├── producto_id missing      → 400 "Falta producto_id"
//!      ├── cantidad not a whole > 0 → 400 VALIDATION_ERROR
//!      ├── product unknown          → 404 "El producto no existe"
//!      ├── not enough stock         → 400 "Stock insuficiente. Quedan N"
//!      │
//!      ▼
//! 201 { "mensaje": "Venta registrada", "id", "total", "ganancia", "erp_sync" }
//! ```
//!
//! `cantidad` accepts `3` or `"3"`. Fractions, booleans and other shapes
//! are rejected rather than truncated.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tienda_core::validation::validate_quantity;
use tienda_core::{Money, SaleLine, SaleType, ValidationError};
use tienda_db::SaleWithLines;

use crate::error::{ApiError, ApiResult};
use crate::routes::json_body;
use crate::services::sale_service::{self, SaleReceipt, SaleRequest};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: u32 = 100;
const MAX_LIST_LIMIT: u32 = 1000;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SaleDto {
    pub id: String,
    pub tipo: SaleType,
    pub total: Money,
    pub ganancia: Money,
    pub fecha: DateTime<Utc>,
    pub detalles: Vec<SaleLineDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleLineDto {
    pub producto_id: String,
    pub producto: String,
    pub cantidad: i64,
    pub precio_unitario: Money,
    pub subtotal: Money,
}

impl From<SaleLine> for SaleLineDto {
    fn from(line: SaleLine) -> Self {
        SaleLineDto {
            producto_id: line.product_id,
            producto: line.product_name,
            cantidad: line.quantity,
            precio_unitario: line.unit_price,
            subtotal: line.subtotal,
        }
    }
}

impl From<SaleWithLines> for SaleDto {
    fn from(entry: SaleWithLines) -> Self {
        let SaleWithLines { sale, lines } = entry;
        SaleDto {
            id: sale.id,
            tipo: sale.sale_type,
            total: sale.total,
            ganancia: sale.profit,
            fecha: sale.created_at,
            detalles: lines.into_iter().map(SaleLineDto::from).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limite: Option<u32>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Sales with their lines, most recent first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<SaleDto>>> {
    let limit = params
        .limite
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let sales = state.db.sales().list_recent(limit).await?;
    Ok(Json(sales.into_iter().map(SaleDto::from).collect()))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<SaleDto>> {
    let sale = state
        .db
        .sales()
        .get_with_lines(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;
    Ok(Json(sale.into()))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaleReceipt>)> {
    let body = json_body(payload)?;
    let request = parse_sale_request(&body)?;
    let receipt = sale_service::register_sale(&state, request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

// =============================================================================
// Request Parsing
// =============================================================================

fn parse_sale_request(body: &Value) -> ApiResult<SaleRequest> {
    let product_id = match body.get("producto_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(ApiError::validation("Falta producto_id")),
    };

    let quantity = parse_quantity(body.get("cantidad"))?;
    let sale_type = SaleType::from_wire(body.get("tipo").and_then(Value::as_str));

    Ok(SaleRequest {
        product_id,
        quantity,
        sale_type,
    })
}

fn parse_quantity(value: Option<&Value>) -> ApiResult<i64> {
    let quantity = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ValidationError::InvalidFormat {
        field: "cantidad".to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    validate_quantity(quantity)?;
    Ok(quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
