//! # kasir-db: Database Layer for Kasir POS
//!
//! This crate provides database access for the Kasir POS backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/checkout)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ category      │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ product       │    │ 001_init.sql │  │   │
//! │  │   │  SqlitePool   │    │ transaction   │    │              │  │   │
//! │  │   │               │    │ report        │    │              │  │   │
//! │  │   └───────▲───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────┴───────────────────────────┐                        │   │
//! │  │   │ CheckoutService<S: CheckoutStore> │ ◄── MemoryStore (tests)│   │
//! │  │   │ (checkout.rs, store.rs)           │                        │   │
//! │  │   └───────────────────────────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                          SQLite Database (WAL)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Catalog CRUD, ledger reads, reports
//! - [`store`] - Checkout unit-of-work contract and its SQLite implementation
//! - [`memory`] - In-process checkout store
//! - [`checkout`] - The checkout orchestrator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_core::{CartLineItem, StockPolicy};
//! use kasir_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kasir.db")).await?;
//!
//! let tx = db
//!     .checkout(StockPolicy::Enforce)
//!     .checkout(&[CartLineItem::new(1, 2), CartLineItem::new(2, 1)])
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutError, CheckoutResult, CheckoutService};
pub use error::{DbError, DbResult};
pub use memory::{FailPoint, MemoryStore};
pub use pool::{Database, DbConfig};
pub use store::{CheckoutStore, CheckoutUnit};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::transaction::TransactionRepository;
