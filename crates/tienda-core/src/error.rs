//! # Error Types
//!
//! Domain-specific error types for tienda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tienda-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tienda-db errors      └── DbError   (wraps CoreError from a tx)       │
//! │  tienda-erp errors     └── ErpError  (never fails a sale)              │
//! │  tienda-api errors     └── ApiError  (what HTTP clients see)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → JSON         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - `producto_id` of a sale request doesn't exist
    /// - Product lookup by id in catalog management
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Insufficient stock to complete sale.
    ///
    /// ## When This Occurs
    /// - Trying to sell more than the units on hand
    /// - A concurrent sale took the last units first
    ///
    /// ## User Workflow
    /// ```text
    /// POST /vender { cantidad: 5 }
    ///      │
    ///      ▼
    /// Conditional decrement: current_stock >= 5 ? → no (3 left)
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// 400 { "error": "Stock insuficiente. Quedan 3" }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Amount above what the ledger can hold.
    ///
    /// ## When This Occurs
    /// - A price, cost or debt over [`MAX_AMOUNT`](crate::validation::MAX_AMOUNT)
    /// - A sale whose total or profit no longer fits in a decimal
    #[error("{field} is out of range")]
    OutOfRange { field: String },

    /// Invalid format (e.g., non-numeric quantity, malformed RUC).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
