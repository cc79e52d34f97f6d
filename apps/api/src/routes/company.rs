//! # Company Profile Endpoints
//!
//! ```json
//! { "ruc": "20601234567", "razon_social": "Bodega Don Lucho", "deuda_historica": "0.00" }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tienda_core::{CompanyProfile, Money};

use crate::error::ApiResult;
use crate::routes::json_body;
use crate::services::company_service::{self, CompanyUpdate};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CompanyDto {
    pub ruc: String,
    pub razon_social: String,
    pub deuda_historica: Money,
    pub actualizado: DateTime<Utc>,
}

impl From<CompanyProfile> for CompanyDto {
    fn from(profile: CompanyProfile) -> Self {
        CompanyDto {
            ruc: profile.tax_id,
            razon_social: profile.business_name,
            deuda_historica: profile.historical_tax_debt,
            actualizado: profile.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompanyInput {
    pub ruc: String,
    pub razon_social: String,
    #[serde(default)]
    pub deuda_historica: Money,
}

pub async fn get(State(state): State<AppState>) -> ApiResult<Json<CompanyDto>> {
    Ok(Json(company_service::get_profile(&state).await?.into()))
}

pub async fn save(
    State(state): State<AppState>,
    payload: Result<Json<CompanyInput>, JsonRejection>,
) -> ApiResult<Json<CompanyDto>> {
    let input = json_body(payload)?;
    let update = CompanyUpdate {
        tax_id: input.ruc,
        business_name: input.razon_social,
        historical_tax_debt: input.deuda_historica,
    };
    let profile = company_service::save_profile(&state, update, Utc::now()).await?;
    Ok(Json(profile.into()))
}
