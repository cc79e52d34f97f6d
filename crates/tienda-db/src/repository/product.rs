//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - CRUD (products are never deleted; sale lines reference them)
//! - Case-insensitive name lookup for the assistant
//! - Low-stock queries for the dashboard
//!
//! Stock is only decremented by [`crate::SaleRepository::record_sale`],
//! inside the sale transaction. Catalog edits set it absolutely.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tienda_core::{Product, ProductDraft};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let all = repo.list().await?;
/// let arroz = repo.search_by_name("arroz", 3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the whole catalog, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, erp_id, name, unit_cost, sale_price,
                   current_stock, min_stock, created_at, updated_at
            FROM products
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, erp_id, name, unit_cost, sale_price,
                   current_stock, min_stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product built from a validated draft.
    ///
    /// The ID is generated here. `erp_id` starts empty.
    pub async fn insert(&self, draft: &ProductDraft, now: DateTime<Utc>) -> DbResult<Product> {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            erp_id: None,
            name: draft.name.trim().to_string(),
            unit_cost: draft.unit_cost,
            sale_price: draft.sale_price,
            current_stock: draft.current_stock,
            min_stock: draft.min_stock,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, erp_id, name, unit_cost, sale_price,
                current_stock, min_stock, created_at, updated_at, name_folded
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(product.erp_id)
        .bind(&product.name)
        .bind(product.unit_cost)
        .bind(product.sale_price)
        .bind(product.current_stock)
        .bind(product.min_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.name.to_lowercase())
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Replaces the editable fields of an existing product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored row after the update
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(
        &self,
        id: &str,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                unit_cost = ?3,
                sale_price = ?4,
                current_stock = ?5,
                min_stock = ?6,
                updated_at = ?7,
                name_folded = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(draft.name.trim())
        .bind(draft.unit_cost)
        .bind(draft.sale_price)
        .bind(draft.current_stock)
        .bind(draft.min_stock)
        .bind(now)
        .bind(draft.name.trim().to_lowercase())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Records the ERP identifier after a successful push.
    pub async fn set_erp_id(&self, id: &str, erp_id: i64) -> DbResult<()> {
        debug!(id = %id, erp_id, "Linking product to ERP");

        let result = sqlx::query("UPDATE products SET erp_id = ?2 WHERE id = ?1")
            .bind(id)
            .bind(erp_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Case-insensitive substring search on the product name.
    ///
    /// Both sides are lowercased with Unicode rules (`name_folded` holds the
    /// stored side). `%` and `_` in the term match literally.
    pub async fn search_by_name(&self, term: &str, limit: u32) -> DbResult<Vec<Product>> {
        let term = term.trim();
        debug!(term = %term, limit, "Searching products by name");

        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, erp_id, name, unit_cost, sale_price,
                   current_stock, min_stock, created_at, updated_at
            FROM products
            WHERE name_folded LIKE ?1 ESCAPE '\'
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Products at or below their threshold, alphabetical.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, erp_id, name, unit_cost, sale_price,
                   current_stock, min_stock, created_at, updated_at
            FROM products
            WHERE current_stock <= min_stock
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Number of products at or below their threshold.
    pub async fn count_low_stock(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE current_stock <= min_stock")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Total number of products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes LIKE wildcards with `\`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Duration;
    use tienda_core::Money;

    fn draft(name: &str, stock: i64, min: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            unit_cost: Money::parse("3.20").unwrap(),
            sale_price: Money::parse("4.50").unwrap(),
            current_stock: stock,
            min_stock: min,
        }
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup().await;
        let repo = db.products();

        let created = repo
            .insert(&draft("  Arroz Costeño 1kg ", 40, 10), Utc::now())
            .await
            .unwrap();
        assert_eq!(created.name, "Arroz Costeño 1kg");
        assert_eq!(created.erp_id, None);

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Arroz Costeño 1kg");
        assert_eq!(fetched.unit_cost, Money::parse("3.20").unwrap());
        assert_eq!(fetched.sale_price, Money::parse("4.50").unwrap());
        assert_eq!(fetched.current_stock, 40);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = setup().await;
        let repo = db.products();
        let t0 = Utc::now();

        repo.insert(&draft("Primero", 1, 0), t0).await.unwrap();
        repo.insert(&draft("Segundo", 1, 0), t0 + Duration::seconds(1))
            .await
            .unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Segundo", "Primero"]);
    }

    #[tokio::test]
    async fn test_update_and_missing() {
        let db = setup().await;
        let repo = db.products();
        let created = repo.insert(&draft("Leche Gloria", 12, 6), Utc::now()).await.unwrap();

        let mut changes = draft("Leche Gloria 400g", 24, 6);
        changes.sale_price = Money::parse("4.80").unwrap();
        let updated = repo.update(&created.id, &changes, Utc::now()).await.unwrap();
        assert_eq!(updated.name, "Leche Gloria 400g");
        assert_eq!(updated.current_stock, 24);
        assert_eq!(updated.sale_price, Money::parse("4.80").unwrap());

        let err = repo.update("missing", &changes, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_erp_id() {
        let db = setup().await;
        let repo = db.products();
        let created = repo.insert(&draft("Aceite Primor", 8, 3), Utc::now()).await.unwrap();

        repo.set_erp_id(&created.id, 77).await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.erp_id, Some(77));

        assert!(repo.set_erp_id("missing", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_search_by_name_is_case_insensitive() {
        let db = setup().await;
        let repo = db.products();
        let now = Utc::now();
        repo.insert(&draft("Arroz Costeño", 5, 2), now).await.unwrap();
        repo.insert(&draft("ARROZ Faraón", 5, 2), now).await.unwrap();
        repo.insert(&draft("Azúcar Rubia", 5, 2), now).await.unwrap();

        let found = repo.search_by_name("arroz", 3).await.unwrap();
        assert_eq!(found.len(), 2);

        let limited = repo.search_by_name("arroz", 1).await.unwrap();
        assert_eq!(limited.len(), 1);

        assert!(repo.search_by_name("quinua", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = setup().await;
        let repo = db.products();
        let created = repo.insert(&draft("ÑOQUIS DE PAPA", 5, 2), Utc::now()).await.unwrap();

        let found = repo.search_by_name("ñoquis", 3).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "ÑOQUIS DE PAPA");
        assert_eq!(repo.search_by_name("Ñoquis", 3).await.unwrap().len(), 1);

        repo.update(&created.id, &draft("Ají Panca ÉXTRA", 5, 2), Utc::now())
            .await
            .unwrap();
        assert!(repo.search_by_name("ñoquis", 3).await.unwrap().is_empty());
        assert_eq!(repo.search_by_name("éxtra", 3).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let db = setup().await;
        let repo = db.products();
        repo.insert(&draft("Detergente Bolívar", 5, 2), Utc::now())
            .await
            .unwrap();

        assert!(repo.search_by_name("%", 3).await.unwrap().is_empty());
        assert!(repo.search_by_name("_", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_stock_queries() {
        let db = setup().await;
        let repo = db.products();
        let now = Utc::now();
        repo.insert(&draft("Yogurt", 2, 5), now).await.unwrap();
        repo.insert(&draft("Atún", 5, 5), now).await.unwrap(); // equal counts as low
        repo.insert(&draft("Fideos", 50, 5), now).await.unwrap();
        repo.insert(&draft("Galletas", 0, 3), now).await.unwrap();
        repo.insert(&draft("Mantequilla", 1, 4), now).await.unwrap();

        assert_eq!(repo.count_low_stock().await.unwrap(), 4);
        assert_eq!(repo.count().await.unwrap(), 5);

        let names: Vec<String> = repo
            .low_stock(3)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Atún", "Galletas", "Mantequilla"]);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("arroz"), "arroz");
    }
}
