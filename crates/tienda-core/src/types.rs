//! # Domain Types
//!
//! Core domain records used throughout Tienda POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  sale_id (FK)   │       │
//! │  │  erp_id?        │◄──│  sale_type      │◄──│  product_id     │       │
//! │  │  sale_price     │   │  total          │   │  product_name   │       │
//! │  │  current_stock  │   │  profit         │   │  unit_price     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ CompanyProfile  │   │    SaleType     │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  tax_id (RUC)   │   │  Retail         │                             │
//! │  │  tax debt       │   │  Wholesale (5%) │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! - `id`: UUID v4 assigned locally, used for all relations
//! - `erp_id`: integer assigned by the ERP after the first successful sync

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Identifier in the ERP, once the product has been pushed there.
    pub erp_id: Option<i64>,

    /// Display name shown to the cashier and used by the assistant lookup.
    pub name: String,

    /// What the shop paid per unit.
    pub unit_cost: Money,

    /// Retail price per unit.
    pub sale_price: Money,

    /// Units on hand. Never negative after a committed sale.
    pub current_stock: i64,

    /// Low-stock threshold.
    pub min_stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Low stock means `current_stock <= min_stock`.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }

    /// Checks if the requested quantity is available.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && self.current_stock >= quantity
    }
}

/// Editable product fields, as submitted by catalog management.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub unit_cost: Money,
    pub sale_price: Money,
    pub current_stock: i64,
    pub min_stock: i64,
}

// =============================================================================
// Sale Type
// =============================================================================

/// Pricing mode of a sale.
///
/// ## Wire Mapping
/// ```text
/// tipo: "MAYOR" / "mayor" / "wholesale"  → Wholesale (5% off)
/// tipo: anything else, or missing        → Retail
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    #[default]
    Retail,
    Wholesale,
}

impl SaleType {
    /// Interprets the optional `tipo` field of a sale request.
    pub fn from_wire(tipo: Option<&str>) -> Self {
        match tipo.map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("MAYOR") || t.eq_ignore_ascii_case("wholesale") => {
                SaleType::Wholesale
            }
            _ => SaleType::Retail,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleType::Retail => "retail",
            SaleType::Wholesale => "wholesale",
        }
    }
}

impl fmt::Display for SaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Sale ledger header. Written once, never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub sale_type: SaleType,
    /// Sum of line subtotals.
    pub total: Money,
    /// Sum of (unit price - unit cost) × quantity over the lines.
    pub profit: Money,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Price actually charged per unit, after any wholesale discount.
    pub unit_price: Money,
    /// quantity × unit_price
    pub subtotal: Money,
}

// =============================================================================
// Company Profile
// =============================================================================

/// The shop's own tax identity. A single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CompanyProfile {
    /// RUC (11 digits).
    pub tax_id: String,
    pub business_name: String,
    /// Outstanding debt with the tax authority.
    pub historical_tax_debt: Money,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
