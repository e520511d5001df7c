//! # Checkout Store
//!
//! The storage contract the checkout orchestrator runs against, and its
//! SQLite implementation.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  store.begin() ──► unit                                                 │
//! │                     ├── fetch_products(ids)       one bulk read         │
//! │                     ├── decrement_stock(id, qty)  once per product      │
//! │                     ├── insert_header(total)      store assigns id      │
//! │                     ├── insert_details(id, rows)  one bulk write        │
//! │                     └── commit()                                        │
//! │                                                                         │
//! │  Dropping the unit without commit() discards every write above.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use kasir_core::{Product, StockPolicy, TransactionDetail, TransactionHeader};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

// =============================================================================
// Traits
// =============================================================================

/// A store that can open checkout units of work.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    type Unit: CheckoutUnit;

    /// Opens a unit of work. Nothing it writes is visible until commit.
    async fn begin(&self) -> DbResult<Self::Unit>;
}

/// An open all-or-nothing unit of work.
#[async_trait]
pub trait CheckoutUnit: Send {
    /// Reads the given products. Unknown ids are simply absent from the map.
    async fn fetch_products(&mut self, ids: &[i64]) -> DbResult<HashMap<i64, Product>>;

    /// Takes `quantity` units from a product's stock.
    ///
    /// Returns `false` when no row was changed: the product vanished, or
    /// under [`StockPolicy::Enforce`] the stock no longer covers `quantity`.
    async fn decrement_stock(
        &mut self,
        product_id: i64,
        quantity: i64,
        policy: StockPolicy,
    ) -> DbResult<bool>;

    /// Inserts the transaction header and returns it with its assigned id.
    async fn insert_header(&mut self, total_amount: i64) -> DbResult<TransactionHeader>;

    /// Inserts all detail rows for `transaction_id`, in the given order.
    async fn insert_details(
        &mut self,
        transaction_id: i64,
        details: &[TransactionDetail],
    ) -> DbResult<()>;

    /// Makes every write of this unit durable and visible at once.
    async fn commit(self) -> DbResult<()>;
}

// =============================================================================
// SQLite
// =============================================================================

/// A checkout unit backed by one SQLite transaction.
///
/// Opened with `BEGIN IMMEDIATE`, so the unit holds the database write lock
/// from its first read. A second checkout waits on the busy timeout instead
/// of failing when it later tries to upgrade a read lock.
///
/// Rolled back by sqlx when dropped uncommitted.
pub struct SqliteUnit {
    tx: sqlx::Transaction<'static, Sqlite>,
}

#[async_trait]
impl CheckoutStore for Database {
    type Unit = SqliteUnit;

    async fn begin(&self) -> DbResult<SqliteUnit> {
        let tx = self
            .pool()
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(SqliteUnit { tx })
    }
}

#[async_trait]
impl CheckoutUnit for SqliteUnit {
    async fn fetch_products(&mut self, ids: &[i64]) -> DbResult<HashMap<i64, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, price, stock, category_id FROM products WHERE id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let products: Vec<Product> = query.build_query_as().fetch_all(&mut *self.tx).await?;

        debug!(requested = ids.len(), found = products.len(), "Fetched checkout products");
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    async fn decrement_stock(
        &mut self,
        product_id: i64,
        quantity: i64,
        policy: StockPolicy,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2,
                updated_at = ?3
            WHERE id = ?1
              AND (?4 OR stock >= ?2)
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .bind(policy.allows_negative())
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_header(&mut self, total_amount: i64) -> DbResult<TransactionHeader> {
        let created_at = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (total_amount, created_at)
            VALUES (?1, ?2)
            RETURNING id
            "#,
        )
        .bind(total_amount)
        .bind(created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(TransactionHeader {
            id,
            total_amount,
            created_at,
        })
    }

    async fn insert_details(
        &mut self,
        transaction_id: i64,
        details: &[TransactionDetail],
    ) -> DbResult<()> {
        if details.is_empty() {
            return Ok(());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO transaction_details \
             (transaction_id, product_id, product_name, unit_price, quantity, subtotal) ",
        );
        query.push_values(details, |mut row, detail| {
            row.push_bind(transaction_id)
                .push_bind(detail.product_id)
                .push_bind(detail.product_name.clone())
                .push_bind(detail.unit_price)
                .push_bind(detail.quantity)
                .push_bind(detail.subtotal);
        });

        let result = query.build().execute(&mut *self.tx).await?;

        if result.rows_affected() != details.len() as u64 {
            return Err(DbError::QueryFailed(format!(
                "expected {} detail rows, inserted {}",
                details.len(),
                result.rows_affected()
            )));
        }

        Ok(())
    }

    async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}
