//! # Category Repository
//!
//! Category CRUD. Deleting a category leaves its products in place with
//! `category_id` cleared (`ON DELETE SET NULL`).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{Category, NewCategory};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Name already taken
    pub async fn insert(&self, input: &NewCategory) -> DbResult<Category> {
        debug!(name = %input.name, "Inserting category");

        let name = input.name.trim();
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO categories (name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(&input.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_name(e, name))?;

        Ok(Category {
            id,
            name: name.to_string(),
            description: input.description.clone(),
        })
    }

    /// Replaces the name and description of a category.
    pub async fn update(&self, id: i64, input: &NewCategory) -> DbResult<Category> {
        debug!(id = id, "Updating category");

        let name = input.name.trim();

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?2,
                description = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(&input.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| unique_name(e, name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(Category {
            id,
            name: name.to_string(),
            description: input.description.clone(),
        })
    }

    /// Deletes a category, uncategorizing its products.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

/// Fills in the offending value on a duplicate-name error.
fn unique_name(err: sqlx::Error, name: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("category name", name),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use kasir_core::{NewCategory, NewProduct};

    fn input(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: format!("Semua {}", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let makanan = repo.insert(&input("Makanan")).await.unwrap();
        let minuman = repo.insert(&input("Minuman")).await.unwrap();
        assert_eq!(repo.list().await.unwrap(), vec![makanan.clone(), minuman.clone()]);

        let renamed = repo.update(makanan.id, &input("Makanan Ringan")).await.unwrap();
        assert_eq!(repo.get_by_id(makanan.id).await.unwrap(), Some(renamed));

        repo.delete(minuman.id).await.unwrap();
        assert!(repo.get_by_id(minuman.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(minuman.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        repo.insert(&input("Minuman")).await.unwrap();
        let err = repo.insert(&input("Minuman")).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "category name");
                assert_eq!(value, "Minuman");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_uncategorizes_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db.categories().insert(&input("Minuman")).await.unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                name: "Aqua 600ml".to_string(),
                price: 4_000,
                stock: 24,
                category_id: Some(category.id),
            })
            .await
            .unwrap();

        db.categories().delete(category.id).await.unwrap();

        let product = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(product.category_id, None);
    }
}
