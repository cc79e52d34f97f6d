//! # ERP Gateway Trait
//!
//! The seam between the sale/catalog services and whatever ERP sits behind.
//! Services hold an `Arc<dyn ErpGateway>`; tests inject a recording fake.

use async_trait::async_trait;
use chrono::NaiveDate;
use tienda_core::Money;

use crate::error::{ErpError, ErpResult};

/// Product fields pushed to the ERP on creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ErpProduct {
    pub name: String,
    pub sale_price: Money,
    pub unit_cost: Money,
}

/// One invoice line, referencing the product by its ERP id.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub erp_product_id: i64,
    pub quantity: i64,
    /// Price actually charged per unit (after any wholesale discount).
    pub unit_price: Money,
}

/// A customer invoice to be created in draft state.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    /// Local business date of the sale.
    pub invoice_date: NaiveDate,
    pub lines: Vec<InvoiceLine>,
}

#[async_trait]
pub trait ErpGateway: Send + Sync {
    /// False when no ERP is configured. Callers skip the call entirely.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Creates the product in the ERP and returns its id.
    async fn create_product(&self, product: &ErpProduct) -> ErpResult<i64>;

    /// Creates a draft customer invoice and returns its id.
    async fn create_invoice(&self, invoice: &InvoiceDraft) -> ErpResult<i64>;
}

/// Gateway used when no ERP is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

#[async_trait]
impl ErpGateway for DisabledGateway {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn create_product(&self, _product: &ErpProduct) -> ErpResult<i64> {
        Err(ErpError::Disabled)
    }

    async fn create_invoice(&self, _invoice: &InvoiceDraft) -> ErpResult<i64> {
        Err(ErpError::Disabled)
    }
}
