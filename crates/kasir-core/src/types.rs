//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Category 1 ──── * Product          (catalog, CRUD-managed)            │
//! │                       │                                                 │
//! │                       │ read + stock decrement by checkout              │
//! │                       ▼                                                 │
//! │  CartLineItem ──► Transaction 1 ──── * TransactionDetail               │
//! │  (input only)     (ledger, append-only, created once by checkout)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `TransactionDetail` copies the product name and unit price at the time
//! of sale, so history survives later renames, repricing, or deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::validation::{
    validate_category_name, validate_description, validate_price, validate_product_name,
    validate_stock, ValidationResult,
};

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Input for creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewCategory {
    /// Validates the category fields.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_category_name(&self.name)?;
        validate_description(&self.description)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Store-assigned identifier.
    pub id: i64,

    /// Display name, snapshotted into transaction details at checkout.
    pub name: String,

    /// Unit price in the smallest currency unit.
    pub price: i64,

    /// Units on hand. Only checkout decrements it.
    pub stock: i64,

    /// Optional category; cleared when the category is deleted.
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl Product {
    /// Creates an uncategorized product value.
    pub fn new(id: i64, name: impl Into<String>, price: i64, stock: i64) -> Self {
        Product {
            id,
            name: name.into(),
            price,
            stock,
            category_id: None,
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::new(self.price)
    }

    /// Checks if `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Input for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl NewProduct {
    /// Validates the product fields.
    ///
    /// The category reference is checked by the database foreign key.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_price(self.price)?;
        validate_stock(self.stock)
    }
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// One requested line of a checkout. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl CartLineItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        CartLineItem {
            product_id,
            quantity,
        }
    }
}

// =============================================================================
// Transaction Ledger
// =============================================================================

/// A line of a recorded transaction.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionDetail {
    /// Owning transaction; zero until the header has been inserted.
    pub transaction_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit price at time of sale (frozen).
    pub unit_price: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub subtotal: i64,
}

impl TransactionDetail {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::new(self.subtotal)
    }
}

/// The header row of a recorded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionHeader {
    pub id: i64,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

/// A completed sale: header plus its ordered details.
///
/// ## Invariants
/// - `total_amount == Σ details[i].subtotal`
/// - `details` is non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub details: Vec<TransactionDetail>,
}

impl Transaction {
    /// Composes a transaction from its header and details.
    pub fn from_parts(header: TransactionHeader, details: Vec<TransactionDetail>) -> Self {
        Transaction {
            id: header.id,
            total_amount: header.total_amount,
            created_at: header.created_at,
            details,
        }
    }

    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::new(self.total_amount)
    }

    /// Checks the ledger invariants.
    pub fn is_consistent(&self) -> bool {
        let sum: Money = self.details.iter().map(TransactionDetail::subtotal).sum();
        !self.details.is_empty()
            && sum == self.total()
            && self
                .details
                .iter()
                .all(|d| d.transaction_id == self.id && Some(d.subtotal) == d.unit_price.checked_mul(d.quantity))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(product_id: i64, unit_price: i64, quantity: i64) -> TransactionDetail {
        TransactionDetail {
            transaction_id: 1,
            product_id,
            product_name: format!("Product {}", product_id),
            unit_price,
            quantity,
            subtotal: unit_price * quantity,
        }
    }

    #[test]
    fn test_product_can_sell() {
        let product = Product::new(1, "Teh Botol", 5_000, 3);
        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));
        assert_eq!(product.price().amount(), 5_000);
    }

    #[test]
    fn test_new_product_validation() {
        let valid = NewProduct {
            name: "Kopi Kapal Api".to_string(),
            price: 2_500,
            stock: 10,
            category_id: None,
        };
        assert!(valid.validate().is_ok());

        let negative_stock = NewProduct {
            stock: -1,
            ..valid.clone()
        };
        assert!(negative_stock.validate().is_err());

        let blank_name = NewProduct {
            name: "   ".to_string(),
            ..valid
        };
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn test_transaction_consistency() {
        let header = TransactionHeader {
            id: 1,
            total_amount: 40_000,
            created_at: Utc::now(),
        };
        let tx = Transaction::from_parts(header.clone(), vec![detail(1, 10_000, 2), detail(2, 20_000, 1)]);
        assert!(tx.is_consistent());

        let wrong_total = Transaction {
            total_amount: 39_999,
            ..tx.clone()
        };
        assert!(!wrong_total.is_consistent());

        let empty = Transaction::from_parts(
            TransactionHeader {
                total_amount: 0,
                ..header
            },
            Vec::new(),
        );
        assert!(!empty.is_consistent());
    }

    #[test]
    fn test_transaction_json_shape() {
        let tx = Transaction::from_parts(
            TransactionHeader {
                id: 5,
                total_amount: 20_000,
                created_at: Utc::now(),
            },
            vec![TransactionDetail {
                transaction_id: 5,
                ..detail(1, 10_000, 2)
            }],
        );
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["total_amount"], 20_000);
        assert_eq!(json["details"][0]["product_name"], "Product 1");
        assert_eq!(json["details"][0]["subtotal"], 20_000);
    }
}
