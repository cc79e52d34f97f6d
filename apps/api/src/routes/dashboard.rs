//! # Dashboard Endpoint
//!
//! ```json
//! {
//!   "kpis": {
//!     "ventas_hoy": "1350.50",
//!     "ganancia_hoy": "312.10",
//!     "pedidos_hoy": 27,
//!     "productos_stock_bajo": 4,
//!     "low_stock_names": ["Arroz", "Camote", "Papa"]
//!   },
//!   "sunat": { "categoria": 1, "cuota": "20.00", "estado": "in_range", "etiqueta": "🟢 En Rango" }
//! }
//! ```

use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use tienda_core::report::{BracketStatus, DailySummary};
use tienda_core::Money;

use crate::error::ApiResult;
use crate::services::report_service;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub fecha: NaiveDate,
    pub kpis: KpisDto,
    pub sunat: SunatDto,
}

#[derive(Debug, Serialize)]
pub struct KpisDto {
    pub ventas_hoy: Money,
    pub ganancia_hoy: Money,
    pub pedidos_hoy: usize,
    pub productos_stock_bajo: i64,
    pub low_stock_names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SunatDto {
    pub categoria: u8,
    pub cuota: Money,
    pub estado: BracketStatus,
    pub etiqueta: &'static str,
}

impl From<DailySummary> for DashboardDto {
    fn from(summary: DailySummary) -> Self {
        DashboardDto {
            fecha: summary.date,
            kpis: KpisDto {
                ventas_hoy: summary.totals.total,
                ganancia_hoy: summary.totals.profit,
                pedidos_hoy: summary.totals.sale_count,
                productos_stock_bajo: summary.low_stock_count,
                low_stock_names: summary.low_stock_names,
            },
            sunat: SunatDto {
                categoria: summary.tax.category,
                cuota: summary.tax.fee,
                estado: summary.tax.status,
                etiqueta: summary.tax.status.label(),
            },
        }
    }
}

pub async fn show(State(state): State<AppState>) -> ApiResult<Json<DashboardDto>> {
    let summary = report_service::daily_summary(&state, Utc::now()).await?;
    Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{draft, seed_product, send, state_with, FakeBehavior, RecordingGateway};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_dashboard_after_sales() {
        let state = state_with(Arc::new(RecordingGateway::new(FakeBehavior::Fail))).await;
        let rice = seed_product(&state, &draft("Arroz Costeño 5kg", 1800, 2290, 12, 5), None).await;
        seed_product(&state, &draft("Papa amarilla", 200, 350, 2, 5), None).await;
        let app = crate::build_router(state);

        for qty in [1, 2] {
            let body = json!({"producto_id": rice.id, "cantidad": qty});
            let (status, _) = send(&app, "POST", "/vender", Some(body.to_string())).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, dashboard) = send(&app, "GET", "/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);

        let kpis = &dashboard["kpis"];
        assert_eq!(kpis["ventas_hoy"], "68.70");
        assert_eq!(kpis["ganancia_hoy"], "14.70");
        assert_eq!(kpis["pedidos_hoy"], 2);
        assert_eq!(kpis["productos_stock_bajo"], 1);
        assert_eq!(kpis["low_stock_names"], json!(["Papa amarilla"]));

        let sunat = &dashboard["sunat"];
        assert_eq!(sunat["categoria"], 1);
        assert_eq!(sunat["cuota"], "20.00");
        assert_eq!(sunat["estado"], "in_range");
    }
}
