//! # tienda-core: Pure Business Logic for Tienda POS
//!
//! This crate holds every rule of the shop that can be expressed without
//! touching a database, a socket or the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tienda POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │   /productos  /vender  /ventas  /dashboard  /chat  /empresa     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ tienda-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ │   │
//! │  │   │  types  │ │  money  │ │ pricing │ │ report  │ │assistant │ │   │
//! │  │   │ Product │ │  Money  │ │ 5% off  │ │ KPIs    │ │ intents  │ │   │
//! │  │   │  Sale   │ │ Decimal │ │ quotes  │ │ RUS     │ │ replies  │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼──────┐  ┌──────────────────────────┐  │
//! │  │   tienda-db (SQLite repositories)  │  │  tienda-erp (Odoo RPC)   │  │
//! │  └────────────────────────────────────┘  └──────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Sale, SaleLine, CompanyProfile)
//! - [`money`] - Exact decimal money (never floating point)
//! - [`pricing`] - Retail/wholesale unit price and sale quotes
//! - [`report`] - Daily windows, KPI totals, tax-bracket estimate
//! - [`assistant`] - Keyword intent matching and reply text
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use tienda_core::money::Money;
//! use tienda_core::pricing::unit_price_for;
//! use tienda_core::SaleType;
//!
//! let list_price = Money::parse("10.00").unwrap();
//! let wholesale = unit_price_for(list_price, SaleType::Wholesale);
//! assert_eq!(wholesale, Money::parse("9.50").unwrap());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assistant;
pub mod error;
pub mod money;
pub mod pricing;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of low-stock product names shown on the dashboard and by the
/// assistant's product lookup.
pub const LOW_STOCK_PREVIEW: usize = 3;

/// Maximum length of a product name, in characters.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;
