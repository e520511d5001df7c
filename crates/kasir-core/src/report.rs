//! # Sales Report
//!
//! Pure summarizing of ledger aggregates into the report returned by
//! `/api/report`. The SQL side (kasir-db) produces per-product rows and
//! header totals for a time range; this module picks the best seller and
//! shapes the result.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::{validate_date_range, ValidationResult};

// =============================================================================
// Report Range
// =============================================================================

/// Half-open UTC interval `[start, end)` over transaction timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportRange {
    /// The whole UTC day `date`.
    pub fn day(date: NaiveDate) -> ValidationResult<Self> {
        Self::dates(date, date)
    }

    /// From the start of `start` through the end of `end`, both inclusive.
    pub fn dates(start: NaiveDate, end: NaiveDate) -> ValidationResult<Self> {
        validate_date_range(start, end)?;

        let next_day = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "end_date".to_string(),
                reason: "out of range".to_string(),
            })?;

        Ok(ReportRange {
            start: midnight(start),
            end: midnight(next_day),
        })
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

// =============================================================================
// Report Rows
// =============================================================================

/// Sales of one product within a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductSales {
    pub product_id: i64,
    /// Name snapshot recorded at checkout.
    pub product_name: String,
    /// Distinct transactions containing the product.
    pub transaction_count: i64,
    pub quantity_sold: i64,
    pub revenue: i64,
}

/// The product with the highest quantity sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSellingProduct {
    pub name: String,
    pub quantity_sold: i64,
}

/// Sales summary over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub total_revenue: i64,
    pub total_transactions: i64,
    /// `None` when nothing was sold in the range.
    pub best_selling_product: Option<BestSellingProduct>,
    pub products: Vec<ProductSales>,
}

impl SalesReport {
    /// Builds the report from header totals and per-product rows.
    ///
    /// Products are ordered by quantity sold, then revenue (both descending),
    /// then name, so the best seller is deterministic on ties.
    pub fn summarize(total_transactions: i64, total_revenue: i64, mut products: Vec<ProductSales>) -> Self {
        products.sort_by(|a, b| {
            b.quantity_sold
                .cmp(&a.quantity_sold)
                .then(b.revenue.cmp(&a.revenue))
                .then_with(|| a.product_name.cmp(&b.product_name))
        });

        let best_selling_product = products.first().map(|p| BestSellingProduct {
            name: p.product_name.clone(),
            quantity_sold: p.quantity_sold,
        });

        SalesReport {
            total_revenue,
            total_transactions,
            best_selling_product,
            products,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
