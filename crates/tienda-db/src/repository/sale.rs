//! # Sale Repository
//!
//! The sale ledger and the one write path that touches stock.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        record_sale(new_sale)                            │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├─ 1. UPDATE products                                                 │
//! │   │        SET current_stock = current_stock - qty                      │
//! │   │      WHERE id = ? AND current_stock >= qty                          │
//! │   │                                                                     │
//! │   │      0 rows? ──► SELECT product ──► ROLLBACK                        │
//! │   │                   missing  → ProductNotFound                        │
//! │   │                   present  → InsufficientStock { available }        │
//! │   │                                                                     │
//! │   ├─ 2. SELECT product (post-decrement, for price/cost/name)            │
//! │   ├─ 3. price_sale(product, qty, sale_type)                             │
//! │   ├─ 4. INSERT sales                                                    │
//! │   └─ 5. INSERT sale_lines                                               │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE is the first statement of the transaction, so
//! the transaction takes the write lock before it reads anything. A second
//! concurrent sale waits on `busy_timeout`, then re-evaluates the condition
//! against the committed stock. Two sales can never both pass the check.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tienda_core::validation::validate_quantity;
use tienda_core::{pricing, CoreError, Product, Sale, SaleLine, SaleType};

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// A sale request that has passed request parsing.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub product_id: String,
    pub quantity: i64,
    pub sale_type: SaleType,
    pub recorded_at: DateTime<Utc>,
}

/// Everything committed by [`SaleRepository::record_sale`].
#[derive(Debug, Clone)]
pub struct RecordedSale {
    pub sale: Sale,
    pub line: SaleLine,
    /// The product as it stands after the decrement.
    pub product: Product,
}

/// A sale header with its lines, for the ledger endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleWithLines {
    #[serde(flatten)]
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the sale ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Decrements stock and writes the sale header and line, atomically.
    ///
    /// ## Errors
    /// * `DbError::Core(CoreError::Validation)` - quantity ≤ 0
    /// * `DbError::Core(CoreError::ProductNotFound)` - unknown product id
    /// * `DbError::Core(CoreError::InsufficientStock)` - not enough units
    ///
    /// On any error nothing is written.
    pub async fn record_sale(&self, new_sale: &NewSale) -> DbResult<RecordedSale> {
        validate_quantity(new_sale.quantity).map_err(CoreError::from)?;

        debug!(
            product_id = %new_sale.product_id,
            quantity = new_sale.quantity,
            sale_type = %new_sale.sale_type,
            "Recording sale"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let decremented = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock - ?2,
                updated_at = ?3
            WHERE id = ?1 AND current_stock >= ?2
            "#,
        )
        .bind(&new_sale.product_id)
        .bind(new_sale.quantity)
        .bind(new_sale.recorded_at)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            let current = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, erp_id, name, unit_cost, sale_price,
                       current_stock, min_stock, created_at, updated_at
                FROM products
                WHERE id = ?1
                "#,
            )
            .bind(&new_sale.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            // Dropping `tx` rolls back
            let err = match current {
                None => CoreError::ProductNotFound(new_sale.product_id.clone()),
                Some(product) => CoreError::InsufficientStock {
                    product: product.name,
                    available: product.current_stock,
                    requested: new_sale.quantity,
                },
            };
            debug!(error = %err, "Sale rejected");
            return Err(err.into());
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, erp_id, name, unit_cost, sale_price,
                   current_stock, min_stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(&new_sale.product_id)
        .fetch_one(&mut *tx)
        .await?;

        let quote = pricing::price_sale(&product, new_sale.quantity, new_sale.sale_type)?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_type: new_sale.sale_type,
            total: quote.total,
            profit: quote.profit,
            created_at: new_sale.recorded_at,
        };

        let line = SaleLine {
            id: Uuid::new_v4().to_string(),
            sale_id: sale.id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: new_sale.quantity,
            unit_price: quote.unit_price,
            subtotal: quote.total,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (id, sale_type, total, profit, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.sale_type)
        .bind(sale.total)
        .bind(sale.profit)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                id, sale_id, product_id, product_name, quantity, unit_price, subtotal
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(&line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.subtotal)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale.id,
            product = %product.name,
            quantity = line.quantity,
            total = %sale.total,
            remaining_stock = product.current_stock,
            "Sale recorded"
        );

        Ok(RecordedSale {
            sale,
            line,
            product,
        })
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_type, total, profit, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets the lines of a sale.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id, product_name, quantity, unit_price, subtotal
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Gets one sale with its lines.
    pub async fn get_with_lines(&self, id: &str) -> DbResult<Option<SaleWithLines>> {
        match self.get_by_id(id).await? {
            Some(sale) => {
                let lines = self.get_lines(&sale.id).await?;
                Ok(Some(SaleWithLines { sale, lines }))
            }
            None => Ok(None),
        }
    }

    /// Most recent sales first, each with its lines.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<SaleWithLines>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_type, total, profit, created_at
            FROM sales
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT l.id, l.sale_id, l.product_id, l.product_name,
                   l.quantity, l.unit_price, l.subtotal
            FROM sale_lines l
            WHERE l.sale_id IN (
                SELECT id FROM sales ORDER BY created_at DESC, rowid DESC LIMIT ?1
            )
            ORDER BY l.rowid
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut by_sale: HashMap<String, Vec<SaleLine>> = HashMap::new();
        for line in lines {
            by_sale.entry(line.sale_id.clone()).or_default().push(line);
        }

        debug!(count = sales.len(), "Listed recent sales");

        Ok(sales
            .into_iter()
            .map(|sale| {
                let lines = by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithLines { sale, lines }
            })
            .collect())
    }

    /// Sale headers with `start <= created_at < end`.
    pub async fn sales_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_type, total, profit, created_at
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Total number of sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use tienda_core::{Money, ProductDraft};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, cost: &str, price: &str, stock: i64) -> Product {
        db.products()
            .insert(
                &ProductDraft {
                    name: name.to_string(),
                    unit_cost: Money::parse(cost).unwrap(),
                    sale_price: Money::parse(price).unwrap(),
                    current_stock: stock,
                    min_stock: 2,
                },
                Utc::now(),
            )
            .await
            .unwrap()
    }

    fn new_sale(product_id: &str, quantity: i64, sale_type: SaleType) -> NewSale {
        NewSale {
            product_id: product_id.to_string(),
            quantity,
            sale_type,
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_retail_sale() {
        let db = setup().await;
        let product = seed_product(&db, "Inca Kola 500ml", "1.80", "2.50", 10).await;

        let recorded = db
            .sales()
            .record_sale(&new_sale(&product.id, 3, SaleType::Retail))
            .await
            .unwrap();

        assert_eq!(recorded.sale.total, Money::parse("7.50").unwrap());
        assert_eq!(recorded.sale.profit, Money::parse("2.10").unwrap());
        assert_eq!(recorded.line.unit_price, Money::parse("2.50").unwrap());
        assert_eq!(recorded.line.product_name, "Inca Kola 500ml");
        assert_eq!(recorded.product.current_stock, 7);

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.current_stock, 7);

        let lines = db.sales().get_lines(&recorded.sale.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_record_wholesale_sale_keeps_exact_decimals() {
        let db = setup().await;
        let product = seed_product(&db, "Arroz Costeño 5kg", "10.00", "12.90", 10).await;

        let recorded = db
            .sales()
            .record_sale(&new_sale(&product.id, 2, SaleType::Wholesale))
            .await
            .unwrap();

        let stored = db.sales().get_by_id(&recorded.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.sale_type, SaleType::Wholesale);
        assert_eq!(stored.total, Money::parse("24.51").unwrap());
        assert_eq!(stored.profit, Money::parse("4.51").unwrap());

        let lines = db.sales().get_lines(&stored.id).await.unwrap();
        assert_eq!(lines[0].unit_price, Money::parse("12.255").unwrap());
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let db = setup().await;
        let product = seed_product(&db, "Leche Gloria", "3.00", "4.20", 2).await;

        let err = db
            .sales()
            .record_sale(&new_sale(&product.id, 3, SaleType::Retail))
            .await
            .unwrap_err();

        match err {
            DbError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.current_stock, 2);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_selling_exact_stock_reaches_zero() {
        let db = setup().await;
        let product = seed_product(&db, "Atún Florida", "4.00", "5.50", 4).await;

        let recorded = db
            .sales()
            .record_sale(&new_sale(&product.id, 4, SaleType::Retail))
            .await
            .unwrap();
        assert_eq!(recorded.product.current_stock, 0);

        let err = db
            .sales()
            .record_sale(&new_sale(&product.id, 1, SaleType::Retail))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock { available: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = setup().await;

        let err = db
            .sales()
            .record_sale(&new_sale("no-such-id", 1, SaleType::Retail))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let db = setup().await;
        let product = seed_product(&db, "Pan Francés", "0.10", "0.20", 100).await;

        for qty in [0, -5] {
            let err = db
                .sales()
                .record_sale(&new_sale(&product.id, qty, SaleType::Retail))
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        }

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.current_stock, 100);
    }

    #[tokio::test]
    async fn test_overflowing_amount_rolls_back() {
        let db = setup().await;
        let product =
            seed_product(&db, "Oro Fino", "1.00", "100000000000000000000", 2_000_000_000).await;

        let err = db
            .sales()
            .record_sale(&new_sale(&product.id, 1_000_000_000, SaleType::Retail))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(tienda_core::ValidationError::OutOfRange { .. }))
        ));

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.current_stock, 2_000_000_000);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first_with_lines() {
        let db = setup().await;
        let product = seed_product(&db, "Galletas Soda", "0.50", "0.80", 50).await;
        let sales = db.sales();

        let mut first = new_sale(&product.id, 1, SaleType::Retail);
        first.recorded_at = Utc::now() - Duration::minutes(5);
        let first = sales.record_sale(&first).await.unwrap();
        let second = sales
            .record_sale(&new_sale(&product.id, 2, SaleType::Retail))
            .await
            .unwrap();

        let recent = sales.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].sale.id, second.sale.id);
        assert_eq!(recent[1].sale.id, first.sale.id);
        assert_eq!(recent[0].lines.len(), 1);
        assert_eq!(recent[0].lines[0].quantity, 2);

        let limited = sales.list_recent(1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].sale.id, second.sale.id);

        let detail = sales.get_with_lines(&first.sale.id).await.unwrap().unwrap();
        assert_eq!(detail.lines[0].product_name, "Galletas Soda");
        assert!(sales.get_with_lines("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sales_between_is_half_open() {
        let db = setup().await;
        let product = seed_product(&db, "Fideos Don Vittorio", "2.00", "3.00", 50).await;
        let sales = db.sales();

        let start = Utc.with_ymd_and_hms(2025, 3, 14, 5, 0, 0).unwrap();
        let end = start + Duration::days(1);

        for at in [
            start - Duration::seconds(1),
            start,
            start + Duration::hours(12),
            end,
        ] {
            let mut sale = new_sale(&product.id, 1, SaleType::Retail);
            sale.recorded_at = at;
            sales.record_sale(&sale).await.unwrap();
        }

        let in_window = sales.sales_between(start, end).await.unwrap();
        assert_eq!(in_window.len(), 2);
        assert_eq!(in_window[0].created_at, start);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_sales_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("race.db")).max_connections(4))
            .await
            .unwrap();
        let product = seed_product(&db, "Gaseosa Guaraná", "1.00", "2.00", 5).await;

        let a = {
            let repo = db.sales();
            let sale = new_sale(&product.id, 3, SaleType::Retail);
            tokio::spawn(async move { repo.record_sale(&sale).await })
        };
        let b = {
            let repo = db.sales();
            let sale = new_sale(&product.id, 3, SaleType::Retail);
            tokio::spawn(async move { repo.record_sale(&sale).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let short = results
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    Err(DbError::Core(CoreError::InsufficientStock { available: 2, .. }))
                )
            })
            .count();

        assert_eq!(ok, 1);
        assert_eq!(short, 1);

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.current_stock, 2);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }
}
