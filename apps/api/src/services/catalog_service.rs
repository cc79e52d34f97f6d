//! # Catalog Management
//!
//! Create, list, fetch and restock products. Creation pushes the product
//! to the ERP after the local insert and stores the returned id.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use tienda_core::validation::validate_product_draft;
use tienda_core::{Product, ProductDraft};
use tienda_erp::ErpProduct;

use crate::error::{ApiError, ApiResult};
use crate::services::erp_sync::{push_product, ErpSyncOutcome};
use crate::state::AppState;

/// All products, most recently created first.
pub async fn list_products(state: &AppState) -> ApiResult<Vec<Product>> {
    Ok(state.db.products().list().await?)
}

pub async fn get_product(state: &AppState, id: &str) -> ApiResult<Product> {
    state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// Inserts the product, then best-effort creates it in the ERP.
///
/// ## Returns
/// The stored product (with `erp_id` set when the ERP answered) and the
/// sync outcome. An ERP failure never fails the creation.
pub async fn create_product(
    state: &AppState,
    draft: ProductDraft,
    now: DateTime<Utc>,
) -> ApiResult<(Product, ErpSyncOutcome)> {
    validate_product_draft(&draft)?;

    let products = state.db.products();
    let mut product = products.insert(&draft, now).await?;
    info!(product_id = %product.id, name = %product.name, "Product created");

    let erp_product = ErpProduct {
        name: product.name.clone(),
        sale_price: product.sale_price,
        unit_cost: product.unit_cost,
    };
    let mut outcome = push_product(state.erp.as_ref(), &erp_product, state.erp_timeout).await;

    if let Some(erp_id) = outcome.erp_id() {
        match products.set_erp_id(&product.id, erp_id).await {
            Ok(()) => product.erp_id = Some(erp_id),
            Err(e) => {
                error!(product_id = %product.id, erp_id, error = %e, "Failed to store ERP id");
                outcome = ErpSyncOutcome::Failed {
                    error: "No se pudo guardar el id del ERP".to_string(),
                };
            }
        }
    }

    Ok((product, outcome))
}

/// Replaces the editable fields. `erp_id` is left untouched.
pub async fn update_product(
    state: &AppState,
    id: &str,
    draft: ProductDraft,
    now: DateTime<Utc>,
) -> ApiResult<Product> {
    validate_product_draft(&draft)?;
    let product = state.db.products().update(id, &draft, now).await?;
    info!(product_id = %product.id, stock = product.current_stock, "Product updated");
    Ok(product)
}

// =============================================================================
// Unit Tests
// =============================================================================
