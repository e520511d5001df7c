//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! This crate holds the business rules of the Kasir backend as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │    /api/products, /api/categories, /api/checkout, /api/report  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │   plan    │  │  summary  │  │   │
//! │  │   │Transaction│  │  checked  │  │ aggregate │  │ best sold │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, checkout unit of work        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Transaction, ...)
//! - [`money`] - Money type with checked integer arithmetic
//! - [`checkout`] - Cart aggregation and checkout planning
//! - [`report`] - Sales report summarizing
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use kasir_core::{Cart, CartLineItem, Product, StockPolicy};
//!
//! let mut catalog = HashMap::new();
//! catalog.insert(1, Product::new(1, "Indomie Goreng", 10_000, 50));
//!
//! let cart = Cart::from_items(&[CartLineItem::new(1, 2)]).unwrap();
//! let plan = cart.plan(&catalog, StockPolicy::Enforce).unwrap();
//!
//! assert_eq!(plan.total_amount.amount(), 20_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use checkout::{Cart, CheckoutPlan, StockPolicy};
pub use money::Money;
pub use report::{ProductSales, ReportRange, SalesReport};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps the bulk `IN (...)` read and the bulk
/// detail insert well under SQLite's bound-parameter limit.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in one checkout.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Applied after duplicate lines are merged.
pub const MAX_ITEM_QUANTITY: i64 = 999;
