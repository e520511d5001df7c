//! # Report Repository
//!
//! Sales aggregates over the ledger for a [`ReportRange`].
//!
//! ```text
//! transactions         ──► COUNT(*), SUM(total_amount)        header totals
//! transaction_details  ──► GROUP BY product_id, product_name  per-product rows
//!                                      │
//!                                      ▼
//!                        SalesReport::summarize (kasir-core)
//! ```
//!
//! Timestamps are RFC 3339 UTC text, so range bounds compare lexically.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kasir_core::{ProductSales, ReportRange, SalesReport};

/// Repository for sales reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Builds the sales report for `range`.
    ///
    /// Both queries run in one read transaction so the totals and the
    /// per-product rows describe the same ledger state.
    pub async fn sales_report(&self, range: ReportRange) -> DbResult<SalesReport> {
        debug!(start = %range.start, end = %range.end, "Building sales report");

        let mut tx = self.pool.begin().await?;

        let (total_transactions, total_revenue): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&mut *tx)
        .await?;

        let products = sqlx::query_as::<_, ProductSales>(
            r#"
            SELECT
                d.product_id,
                d.product_name,
                COUNT(DISTINCT d.transaction_id) AS transaction_count,
                SUM(d.quantity) AS quantity_sold,
                SUM(d.subtotal) AS revenue
            FROM transaction_details d
            INNER JOIN transactions t ON t.id = d.transaction_id
            WHERE t.created_at >= ?1 AND t.created_at < ?2
            GROUP BY d.product_id, d.product_name
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SalesReport::summarize(total_transactions, total_revenue, products))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::{Days, Utc};

    use crate::pool::{Database, DbConfig};
    use kasir_core::{CartLineItem, NewProduct, ReportRange, StockPolicy};

    async fn seeded() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ids = Vec::new();
        for (name, price) in [("Beras 5kg", 10_000), ("Minyak Goreng", 20_000)] {
            let p = db
                .products()
                .insert(&NewProduct {
                    name: name.to_string(),
                    price,
                    stock: 100,
                    category_id: None,
                })
                .await
                .unwrap();
            ids.push(p.id);
        }
        (db, ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_today_report() {
        let (db, beras, minyak) = seeded().await;
        let checkout = db.checkout(StockPolicy::Enforce);

        checkout
            .checkout(&[CartLineItem::new(beras, 2), CartLineItem::new(minyak, 1)])
            .await
            .unwrap();
        checkout
            .checkout(&[CartLineItem::new(beras, 3)])
            .await
            .unwrap();

        let range = ReportRange::day(Utc::now().date_naive()).unwrap();
        let report = db.reports().sales_report(range).await.unwrap();

        // Two headers, even though the first one has two detail lines
        assert_eq!(report.total_transactions, 2);
        assert_eq!(report.total_revenue, 70_000);

        let best = report.best_selling_product.unwrap();
        assert_eq!(best.name, "Beras 5kg");
        assert_eq!(best.quantity_sold, 5);

        assert_eq!(report.products.len(), 2);
        assert_eq!(report.products[0].transaction_count, 2);
        assert_eq!(report.products[0].revenue, 50_000);
        assert_eq!(report.products[1].quantity_sold, 1);
    }

    #[tokio::test]
    async fn test_empty_range() {
        let (db, beras, _) = seeded().await;
        db.checkout(StockPolicy::Enforce)
            .checkout(&[CartLineItem::new(beras, 1)])
            .await
            .unwrap();

        let yesterday = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .unwrap();
        let report = db
            .reports()
            .sales_report(ReportRange::day(yesterday).unwrap())
            .await
            .unwrap();

        assert_eq!(report.total_transactions, 0);
        assert_eq!(report.total_revenue, 0);
        assert!(report.best_selling_product.is_none());
        assert!(report.products.is_empty());
    }
}
