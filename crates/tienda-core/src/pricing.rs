//! # Pricing
//!
//! Unit price selection and sale quotes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quote_sale(product, qty, sale_type)                                    │
//! │                                                                         │
//! │   qty > 0 ?                ── no ──► ValidationError::MustBePositive    │
//! │      │                                                                  │
//! │   qty <= current_stock ?   ── no ──► CoreError::InsufficientStock       │
//! │      │                                                                  │
//! │   unit_price = sale_price            (Retail)                           │
//! │              = sale_price × 0.95     (Wholesale, flat, no tiers)        │
//! │      │                                                                  │
//! │   total  = unit_price × qty                                             │
//! │   profit = (unit_price − unit_cost) × qty                               │
//! │      │                                                                  │
//! │   fits in a Decimal ?      ── no ──► ValidationError::OutOfRange        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database layer calls [`price_sale`] after it has already decremented
//! stock inside the transaction, so the stock check is kept separate in
//! [`check_stock`].

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, SaleType};
use crate::validation::validate_quantity;

/// Wholesale discount in basis points (5%).
pub const WHOLESALE_DISCOUNT_BPS: u32 = 500;

/// Price computation for one line of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleQuote {
    pub sale_type: SaleType,
    pub quantity: i64,
    /// Price charged per unit.
    pub unit_price: Money,
    /// unit_price × quantity
    pub total: Money,
    /// (unit_price − unit_cost) × quantity
    pub profit: Money,
}

/// Returns the unit price charged for a given list price and sale type.
#[inline]
pub fn unit_price_for(sale_price: Money, sale_type: SaleType) -> Money {
    match sale_type {
        SaleType::Retail => sale_price,
        SaleType::Wholesale => sale_price.discounted_by_bps(WHOLESALE_DISCOUNT_BPS),
    }
}

/// Fails with `InsufficientStock` when the product cannot cover `quantity`.
pub fn check_stock(product: &Product, quantity: i64) -> CoreResult<()> {
    if product.current_stock < quantity {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.current_stock,
            requested: quantity,
        });
    }
    Ok(())
}

/// Computes the line amounts without looking at stock.
pub fn price_sale(product: &Product, quantity: i64, sale_type: SaleType) -> CoreResult<SaleQuote> {
    validate_quantity(quantity)?;

    let unit_price = unit_price_for(product.sale_price, sale_type);
    let total = unit_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| out_of_range("total"))?;
    let profit = unit_price
        .checked_sub(product.unit_cost)
        .and_then(|margin| margin.checked_multiply_quantity(quantity))
        .ok_or_else(|| out_of_range("ganancia"))?;

    Ok(SaleQuote {
        sale_type,
        quantity,
        unit_price,
        total,
        profit,
    })
}

fn out_of_range(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
    }
    .into()
}

/// Validates quantity and stock, then prices the sale.
pub fn quote_sale(product: &Product, quantity: i64, sale_type: SaleType) -> CoreResult<SaleQuote> {
    validate_quantity(quantity)?;
    check_stock(product, quantity)?;
    price_sale(product, quantity, sale_type)
}

// =============================================================================
// Unit Tests
// =============================================================================
