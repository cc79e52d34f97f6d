//! # Company Repository
//!
//! The company profile is a single row (`id = 1`). It is read by the
//! assistant's debt reply and edited through `PUT /empresa`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tienda_core::CompanyProfile;

/// Repository for the company profile.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    /// Creates a new CompanyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// Returns the profile, or `None` if it was never configured.
    pub async fn get(&self) -> DbResult<Option<CompanyProfile>> {
        let profile = sqlx::query_as::<_, CompanyProfile>(
            r#"
            SELECT tax_id, business_name, historical_tax_debt, updated_at
            FROM company_profile
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Creates or replaces the profile.
    pub async fn upsert(&self, profile: &CompanyProfile) -> DbResult<CompanyProfile> {
        debug!(tax_id = %profile.tax_id, "Saving company profile");

        sqlx::query(
            r#"
            INSERT INTO company_profile (id, tax_id, business_name, historical_tax_debt, updated_at)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                tax_id = excluded.tax_id,
                business_name = excluded.business_name,
                historical_tax_debt = excluded.historical_tax_debt,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.tax_id)
        .bind(&profile.business_name)
        .bind(profile.historical_tax_debt)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use tienda_core::Money;

    #[tokio::test]
    async fn test_profile_absent_then_upserted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.company();

        assert!(repo.get().await.unwrap().is_none());

        let mut profile = CompanyProfile {
            tax_id: "20601234567".to_string(),
            business_name: "Bodega Doña Rosa".to_string(),
            historical_tax_debt: Money::parse("1350.00").unwrap(),
            updated_at: Utc::now(),
        };
        repo.upsert(&profile).await.unwrap();

        let stored = repo.get().await.unwrap().unwrap();
        assert_eq!(stored.tax_id, "20601234567");
        assert_eq!(stored.historical_tax_debt, Money::parse("1350.00").unwrap());

        profile.historical_tax_debt = Money::ZERO;
        repo.upsert(&profile).await.unwrap();

        let stored = repo.get().await.unwrap().unwrap();
        assert!(stored.historical_tax_debt.is_zero());

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM company_profile")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}
