//! # Validation Module
//!
//! Input validation utilities for Tienda POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                          │
//! │  ├── JSON shape, numeric coercion of `cantidad`                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── quantity > 0, name length, non-negative money and stock           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (current_stock >= 0), CHECK (quantity > 0)                  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ProductDraft;
use crate::MAX_PRODUCT_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Length of a Peruvian RUC.
pub const TAX_ID_LEN: usize = 11;

/// Largest price, cost or debt accepted from a client: S/ 1,000,000,000.
pub const MAX_AMOUNT: Money = Money::new(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use tienda_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Leche Gloria 400g").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "nombre".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "nombre".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a RUC: exactly 11 ASCII digits.
pub fn validate_tax_id(tax_id: &str) -> ValidationResult<()> {
    let tax_id = tax_id.trim();

    if tax_id.is_empty() {
        return Err(ValidationError::Required {
            field: "ruc".to_string(),
        });
    }

    if tax_id.len() != TAX_ID_LEN || !tax_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "ruc".to_string(),
            reason: format!("must be {} digits", TAX_ID_LEN),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be positive (> 0). Zero is malformed input, not a no-op.
///
/// ## User Workflow
/// ```text
/// POST /vender { cantidad: 0 }
///      │
///      ▼
/// validate_quantity(0) ← THIS FUNCTION
///      │
///      └── qty <= 0? → 400 "cantidad must be positive"
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "cantidad".to_string(),
        });
    }

    Ok(())
}

/// Validates a money amount that may be zero but not negative.
///
/// ## Rules
/// - `0 <= amount <= MAX_AMOUNT`
pub fn validate_non_negative_money(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level or threshold.
pub fn validate_stock_level(field: &str, units: i64) -> ValidationResult<()> {
    if units < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates every field of a product create/update request.
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_product_name(&draft.name)?;
    validate_non_negative_money("costo_unitario", draft.unit_cost)?;
    validate_non_negative_money("precio_venta", draft.sale_price)?;
    validate_stock_level("stock_actual", draft.current_stock)?;
    validate_stock_level("stock_minimo", draft.min_stock)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
