//! Company profile administration.

use chrono::{DateTime, Utc};
use tracing::info;

use tienda_core::validation::{validate_non_negative_money, validate_tax_id};
use tienda_core::{CompanyProfile, Money, ValidationError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyUpdate {
    pub tax_id: String,
    pub business_name: String,
    pub historical_tax_debt: Money,
}

pub async fn get_profile(state: &AppState) -> ApiResult<CompanyProfile> {
    state
        .db
        .company()
        .get()
        .await?
        .ok_or_else(|| ApiError::not_found("Company profile", "1"))
}

pub async fn save_profile(
    state: &AppState,
    update: CompanyUpdate,
    now: DateTime<Utc>,
) -> ApiResult<CompanyProfile> {
    validate_tax_id(&update.tax_id)?;
    validate_non_negative_money("deuda_historica", update.historical_tax_debt)?;

    let business_name = update.business_name.trim();
    if business_name.is_empty() {
        return Err(ValidationError::Required {
            field: "razon_social".to_string(),
        }
        .into());
    }

    let profile = state
        .db
        .company()
        .upsert(&CompanyProfile {
            tax_id: update.tax_id.trim().to_string(),
            business_name: business_name.to_string(),
            historical_tax_debt: update.historical_tax_debt,
            updated_at: now,
        })
        .await?;

    info!(tax_id = %profile.tax_id, "Company profile saved");
    Ok(profile)
}
