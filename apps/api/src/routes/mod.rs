//! # HTTP Routes
//!
//! ## Endpoint Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Method  Path              Handler                   Service            │
//! │  ──────  ────              ───────                   ───────            │
//! │  GET     /productos        products::list            catalog            │
//! │  POST    /productos        products::create          catalog + ERP      │
//! │  GET     /productos/{id}   products::get             catalog            │
//! │  PUT     /productos/{id}   products::update          catalog            │
//! │  GET     /ventas           sales::list               ledger             │
//! │  GET     /ventas/{id}      sales::get                ledger             │
//! │  POST    /vender           sales::register           sale + ERP         │
//! │  GET     /dashboard        dashboard::show           report             │
//! │  POST    /chat             chat::reply               assistant          │
//! │  GET     /empresa          company::get              company            │
//! │  PUT     /empresa          company::save             company            │
//! │  GET     /health           health::check             -                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wire field names are Spanish (`nombre`, `precio_venta`, ...) and money is
//! a decimal string. Handlers stay thin: parse, call a service, shape the
//! response.

pub mod chat;
pub mod company;
pub mod dashboard;
pub mod health;
pub mod products;
pub mod sales;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// All endpoints, without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/productos", get(products::list).post(products::create))
        .route("/productos/{id}", get(products::get).put(products::update))
        .route("/ventas", get(sales::list))
        .route("/ventas/{id}", get(sales::get))
        .route("/vender", post(sales::register))
        .route("/dashboard", get(dashboard::show))
        .route("/chat", post(chat::reply))
        .route("/empresa", get(company::get).put(company::save))
        .route("/health", get(health::check))
        .with_state(state)
}

/// Unwraps a JSON body, turning axum's rejection into our 400 shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::validation(rejection.body_text())),
    }
}
