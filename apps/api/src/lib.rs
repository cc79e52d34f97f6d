//! # Tienda API
//!
//! HTTP surface of the shop backend: catalog, sale registration, daily
//! reports, the assistant and company administration.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP ──► TraceLayer ──► routes (parse) ──► services ──► tienda-db      │
//! │                                                 │                       │
//! │                                                 └──► ErpGateway          │
//! │                                                      (after commit,     │
//! │                                                       bounded)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// The full application: every route plus request tracing.
pub fn build_router(state: AppState) -> Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}
