//! Liveness plus a database round-trip.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// 200 when the database answers, 503 otherwise.
pub async fn check(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.health_check().await;
    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(json!({
            "status": label,
            "database": database,
            "erp_enabled": state.erp.is_enabled(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use crate::test_support::{send, state_with};
    use axum::http::StatusCode;
    use std::sync::Arc;
    use tienda_erp::DisabledGateway;

    #[tokio::test]
    async fn test_health() {
        let state = state_with(Arc::new(DisabledGateway)).await;
        let app = crate::build_router(state.clone());

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], true);
        assert_eq!(body["erp_enabled"], false);

        state.db.close().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
    }
}
