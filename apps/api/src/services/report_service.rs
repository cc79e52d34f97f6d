//! # Daily Reporting
//!
//! "Today" is the calendar day of `now` in the configured offset, queried
//! as the half-open UTC range `[start, end)`.

use chrono::{DateTime, Utc};

use tienda_core::report::{day_bounds, local_date, DailySummary, DailyTotals};
use tienda_core::{Money, LOW_STOCK_PREVIEW};

use crate::error::ApiResult;
use crate::state::AppState;

/// Totals of the sales made today.
pub async fn today_totals(state: &AppState, now: DateTime<Utc>) -> ApiResult<DailyTotals> {
    let (start, end) = day_bounds(local_date(now, state.utc_offset), state.utc_offset);
    let sales = state.db.sales().sales_between(start, end).await?;
    Ok(DailyTotals::from_sales(&sales)?)
}

/// Raw sum of today's sale totals.
pub async fn today_total(state: &AppState, now: DateTime<Utc>) -> ApiResult<Money> {
    Ok(today_totals(state, now).await?.total)
}

/// KPIs and the tax-bracket estimate shown on the dashboard.
pub async fn daily_summary(state: &AppState, now: DateTime<Utc>) -> ApiResult<DailySummary> {
    let totals = today_totals(state, now).await?;

    let products = state.db.products();
    let low_stock_count = products.count_low_stock().await?;
    let low_stock_names = products
        .low_stock(LOW_STOCK_PREVIEW as u32)
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    Ok(DailySummary::new(
        local_date(now, state.utc_offset),
        totals,
        low_stock_count,
        low_stock_names,
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================
