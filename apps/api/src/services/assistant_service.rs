//! # Assistant
//!
//! Answers `POST /chat`. The message is classified by keyword (tax, stock,
//! debt, sales, help, in that priority) and only the data the matched
//! intent needs is loaded.

use chrono::{DateTime, Utc};

use tienda_core::assistant::{self, Intent};
use tienda_core::LOW_STOCK_PREVIEW;

use crate::error::ApiResult;
use crate::services::report_service::today_total;
use crate::state::AppState;

pub async fn reply(state: &AppState, message: &str, now: DateTime<Utc>) -> ApiResult<String> {
    let text = match assistant::classify(message) {
        Intent::TaxEstimate => assistant::tax_reply(today_total(state, now).await?),
        Intent::Stock { query: Some(query) } => {
            let matches = state
                .db
                .products()
                .search_by_name(&query, LOW_STOCK_PREVIEW as u32)
                .await?;
            assistant::stock_lookup_reply(&query, &matches)
        }
        Intent::Stock { query: None } => {
            assistant::stock_overview_reply(state.db.products().count_low_stock().await?)
        }
        Intent::Debt => {
            let profile = state.db.company().get().await?;
            assistant::debt_reply(profile.as_ref())
        }
        Intent::DailySales => assistant::sales_reply(today_total(state, now).await?),
        Intent::Help => assistant::HELP_TEXT.to_string(),
    };

    Ok(text)
}

// =============================================================================
// Unit Tests
// =============================================================================
