//! # Daily Reporting
//!
//! Pure math behind the dashboard and the assistant's tax replies.
//!
//! ## "Today"
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Serving timezone: fixed UTC offset (Lima = UTC−05:00)                  │
//! │                                                                         │
//! │  local day 2025-03-14                                                   │
//! │     [00:00 local ............................ 24:00 local)             │
//! │     [05:00Z 2025-03-14 ....................... 05:00Z 2025-03-15)       │
//! │                                                                         │
//! │  Half-open: a sale stamped exactly at 05:00Z on the 15th is tomorrow's │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Nuevo RUS Simulation
//! Two flat-fee brackets keyed on today's sales:
//! - total ≤ 5000 → category 1, fee S/ 20, `in_range`
//! - total > 5000 → category 2, fee S/ 50, `caution`

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Sale;
use crate::LOW_STOCK_PREVIEW;

// =============================================================================
// Day Windows
// =============================================================================

/// Calendar date of `now` in the serving timezone.
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// UTC bounds `[start, end)` of a local calendar day.
pub fn day_bounds(day: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = day.and_time(NaiveTime::MIN);
    let utc_midnight = local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
    let start = Utc.from_utc_datetime(&utc_midnight);
    (start, start + Duration::days(1))
}

// =============================================================================
// Daily Totals
// =============================================================================

/// Aggregates of the sales made in one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyTotals {
    pub total: Money,
    pub profit: Money,
    pub sale_count: usize,
}

impl DailyTotals {
    /// Sums sale headers exactly (decimal, never float).
    ///
    /// Fails with `OutOfRange` when a running sum no longer fits.
    pub fn from_sales(sales: &[Sale]) -> CoreResult<Self> {
        let total = Money::checked_sum(sales.iter().map(|s| s.total)).ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "ventas_hoy".to_string(),
            }
        })?;
        let profit = Money::checked_sum(sales.iter().map(|s| s.profit)).ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "ganancia_hoy".to_string(),
            }
        })?;

        Ok(DailyTotals {
            total,
            profit,
            sale_count: sales.len(),
        })
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub totals: DailyTotals,
    pub low_stock_count: i64,
    /// At most [`LOW_STOCK_PREVIEW`] names.
    pub low_stock_names: Vec<String>,
    pub tax: TaxBracket,
}

impl DailySummary {
    pub fn new(
        date: NaiveDate,
        totals: DailyTotals,
        low_stock_count: i64,
        mut low_stock_names: Vec<String>,
    ) -> Self {
        low_stock_names.truncate(LOW_STOCK_PREVIEW);
        DailySummary {
            date,
            tax: estimate_tax_bracket(totals.total),
            totals,
            low_stock_count,
            low_stock_names,
        }
    }
}

// =============================================================================
// Tax Bracket
// =============================================================================

/// Upper bound (inclusive) of the first bracket.
pub const BRACKET_ONE_CEILING: Money = Money::new(Decimal::from_parts(5000, 0, 0, false, 0));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    InRange,
    Caution,
}

impl BracketStatus {
    /// Label shown on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            BracketStatus::InRange => "🟢 En Rango",
            BracketStatus::Caution => "🟡 Cuidado (Límite RUS)",
        }
    }
}

/// Estimated flat fee for the day's sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub category: u8,
    pub fee: Money,
    pub status: BracketStatus,
}

/// Two-bracket flat-fee simulation; the boundary is inclusive at 5000.00.
pub fn estimate_tax_bracket(total_sales: Money) -> TaxBracket {
    if total_sales <= BRACKET_ONE_CEILING {
        TaxBracket {
            category: 1,
            fee: Money::from_cents(2000),
            status: BracketStatus::InRange,
        }
    } else {
        TaxBracket {
            category: 2,
            fee: Money::from_cents(5000),
            status: BracketStatus::Caution,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
