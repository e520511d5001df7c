//! # Checkout
//!
//! Turns a cart into exactly one committed transaction, or into nothing.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CheckoutService::checkout                        │
//! │                                                                         │
//! │  items ──► Cart::from_items         InvalidCart (before any I/O)       │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  store.begin() ───────────────────────────────────────────┐            │
//! │              │                                             │            │
//! │  fetch_products(ids)                                       │            │
//! │  cart.plan(snapshot)                ProductNotFound        │  dropped   │
//! │              │                      InsufficientStock      │  unit =    │
//! │  decrement_stock × N                InsufficientStock      │  rollback  │
//! │  insert_header(total) ──► id                               │            │
//! │  insert_details(id, rows)                                  │            │
//! │              │                                             │            │
//! │  commit() ◄────────────────────────────────────────────────┘            │
//! │              │                                                          │
//! │              ▼                                                          │
//! │        Transaction                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every early return drops the open unit, which discards its writes.
//! Checkout is not idempotent: submitting the same cart twice records two
//! transactions and decrements stock twice.

use thiserror::Error;
use tracing::{debug, info, warn};

use kasir_core::{Cart, CartLineItem, CoreError, StockPolicy, Transaction};

use crate::error::DbError;
use crate::store::{CheckoutStore, CheckoutUnit};

/// Why a checkout produced no transaction.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart itself was refused: invalid, unknown product, short stock.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// The store failed part-way; nothing was committed.
    #[error("Checkout storage failure: {0}")]
    Storage(#[from] DbError),
}

/// Result type for checkout.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Runs checkouts against a [`CheckoutStore`].
#[derive(Debug, Clone)]
pub struct CheckoutService<S> {
    store: S,
    policy: StockPolicy,
}

impl<S: CheckoutStore> CheckoutService<S> {
    /// Creates a service enforcing available stock.
    pub fn new(store: S) -> Self {
        CheckoutService {
            store,
            policy: StockPolicy::default(),
        }
    }

    /// Sets the stock policy.
    pub fn with_policy(mut self, policy: StockPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Records one sale for `items`.
    ///
    /// ## Returns
    /// * `Ok(Transaction)` - committed header plus details in cart order
    /// * `Err(CheckoutError::Rejected)` - nothing was written
    /// * `Err(CheckoutError::Storage)` - nothing was committed
    pub async fn checkout(&self, items: &[CartLineItem]) -> CheckoutResult<Transaction> {
        let cart = Cart::from_items(items)?;
        debug!(lines = cart.lines().len(), "Starting checkout");

        let mut unit = self.store.begin().await?;

        let catalog = unit.fetch_products(&cart.product_ids()).await?;
        let plan = cart.plan(&catalog, self.policy)?;

        for line in &plan.lines {
            let applied = unit
                .decrement_stock(line.product_id, line.quantity, self.policy)
                .await?;

            // Stock moved between the snapshot and the guarded update
            if !applied {
                warn!(
                    product_id = line.product_id,
                    requested = line.quantity,
                    "Stock decrement rejected"
                );
                return Err(CoreError::InsufficientStock {
                    product_id: line.product_id,
                    available: line.available,
                    requested: line.quantity,
                }
                .into());
            }
        }

        let header = unit.insert_header(plan.total_amount.amount()).await?;
        let details = plan.details_for(header.id);
        unit.insert_details(header.id, &details).await?;
        unit.commit().await?;

        let transaction = Transaction::from_parts(header, details);
        debug_assert!(transaction.is_consistent());

        info!(
            transaction_id = transaction.id,
            total_amount = transaction.total_amount,
            lines = transaction.details.len(),
            "Checkout committed"
        );

        Ok(transaction)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailPoint, MemoryStore};
    use crate::pool::{Database, DbConfig};
    use kasir_core::{NewProduct, Product, ValidationError};
    use std::time::Duration;
    use tempfile::TempDir;

    fn store() -> MemoryStore {
        MemoryStore::with_products([
            Product::new(1, "Beras 5kg", 10_000, 50),
            Product::new(2, "Minyak Goreng", 20_000, 30),
        ])
    }

    fn reference_cart() -> Vec<CartLineItem> {
        vec![CartLineItem::new(1, 2), CartLineItem::new(2, 1)]
    }

    async fn sqlite_with_products() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();
        let a = products
            .insert(&NewProduct {
                name: "Beras 5kg".to_string(),
                price: 10_000,
                stock: 50,
                category_id: None,
            })
            .await
            .unwrap();
        let b = products
            .insert(&NewProduct {
                name: "Minyak Goreng".to_string(),
                price: 20_000,
                stock: 30,
                category_id: None,
            })
            .await
            .unwrap();
        (db, a.id, b.id)
    }

    /// A file database, so the pool can hold several writers at once.
    async fn file_database(dir: &TempDir) -> Database {
        let config = DbConfig::new(dir.path().join("kasir.db"))
            .max_connections(8)
            .busy_timeout(Duration::from_secs(30));
        Database::new(config).await.unwrap()
    }

    async fn insert_product(db: &Database, name: &str, price: i64, stock: i64) -> i64 {
        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                price,
                stock,
                category_id: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    // -------------------------------------------------------------------------
    // In-memory store
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_reference_checkout() {
        let store = store();
        let service = CheckoutService::new(store.clone());

        let tx = service.checkout(&reference_cart()).await.unwrap();

        assert_eq!(tx.id, 1);
        assert_eq!(tx.total_amount, 40_000);
        assert_eq!(tx.details.len(), 2);
        assert_eq!(tx.details[0].subtotal, 20_000);
        assert_eq!(tx.details[1].subtotal, 20_000);
        assert!(tx.is_consistent());

        assert_eq!(store.stock(1).await, Some(48));
        assert_eq!(store.stock(2).await, Some(29));
        assert_eq!(store.transaction(1).await, Some(tx));
    }

    #[tokio::test]
    async fn test_checkout_is_not_idempotent() {
        let store = store();
        let service = CheckoutService::new(store.clone());

        let first = service.checkout(&reference_cart()).await.unwrap();
        let second = service.checkout(&reference_cart()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.transaction_count().await, 2);
        assert_eq!(store.stock(1).await, Some(46));
        assert_eq!(store.stock(2).await, Some(28));
    }

    #[tokio::test]
    async fn test_unknown_product_writes_nothing() {
        let store = store();
        let service = CheckoutService::new(store.clone());

        let err = service
            .checkout(&[CartLineItem::new(1, 2), CartLineItem::new(99, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Rejected(CoreError::ProductNotFound(99))));
        assert_eq!(store.stock(1).await, Some(50));
        assert_eq!(store.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_cart_rejected() {
        let service = CheckoutService::new(store());

        let err = service.checkout(&[]).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::InvalidCart(ValidationError::Required { .. }))
        ));

        let err = service
            .checkout(&[CartLineItem::new(1, -3)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Rejected(CoreError::InvalidCart(_))));
    }

    #[tokio::test]
    async fn test_failure_at_any_step_leaves_no_trace() {
        let store = store();

        for point in [
            FailPoint::FetchProducts,
            FailPoint::DecrementStock,
            FailPoint::InsertHeader,
            FailPoint::InsertDetails,
            FailPoint::Commit,
        ] {
            let service = CheckoutService::new(store.failing_at(point));
            let err = service.checkout(&reference_cart()).await.unwrap_err();

            assert!(matches!(err, CheckoutError::Storage(_)), "{:?}", point);
            assert_eq!(store.stock(1).await, Some(50), "{:?}", point);
            assert_eq!(store.stock(2).await, Some(30), "{:?}", point);
            assert_eq!(store.transaction_count().await, 0, "{:?}", point);
            assert_eq!(store.detail_count().await, 0, "{:?}", point);
        }

        // The store is still usable and no id was burned
        let tx = CheckoutService::new(store.clone())
            .checkout(&reference_cart())
            .await
            .unwrap();
        assert_eq!(tx.id, 1);
    }

    #[tokio::test]
    async fn test_insufficient_stock() {
        let store = store();
        let service = CheckoutService::new(store.clone());

        let err = service
            .checkout(&[CartLineItem::new(2, 10), CartLineItem::new(1, 51)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::InsufficientStock {
                product_id: 1,
                available: 50,
                requested: 51
            })
        ));
        assert_eq!(store.stock(2).await, Some(30));
    }

    #[tokio::test]
    async fn test_allow_negative_stock() {
        let store = store();
        let service = CheckoutService::new(store.clone()).with_policy(StockPolicy::AllowNegative);

        let tx = service.checkout(&[CartLineItem::new(1, 51)]).await.unwrap();

        assert_eq!(tx.total_amount, 510_000);
        assert_eq!(store.stock(1).await, Some(-1));
    }

    #[tokio::test]
    async fn test_duplicate_lines_become_one_detail() {
        let service = CheckoutService::new(store());

        let tx = service
            .checkout(&[
                CartLineItem::new(1, 1),
                CartLineItem::new(2, 1),
                CartLineItem::new(1, 2),
            ])
            .await
            .unwrap();

        let lines: Vec<(i64, i64)> = tx.details.iter().map(|d| (d.product_id, d.quantity)).collect();
        assert_eq!(lines, vec![(1, 3), (2, 1)]);
        assert_eq!(tx.total_amount, 50_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_never_oversell() {
        let store = MemoryStore::with_products([Product::new(1, "Gula 1kg", 15_000, 20)]);
        let service = CheckoutService::new(store.clone());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.checkout(&[CartLineItem::new(1, 5)]).await })
            })
            .collect();

        let mut committed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(err) => assert!(matches!(
                    err,
                    CheckoutError::Rejected(CoreError::InsufficientStock { .. })
                )),
            }
        }

        assert_eq!(committed, 4);
        assert_eq!(store.stock(1).await, Some(0));
        assert_eq!(store.transaction_count().await, 4);
    }

    // -------------------------------------------------------------------------
    // SQLite store
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sqlite_reference_checkout() {
        let (db, a, b) = sqlite_with_products().await;
        let service = db.checkout(StockPolicy::Enforce);

        let tx = service
            .checkout(&[CartLineItem::new(a, 2), CartLineItem::new(b, 1)])
            .await
            .unwrap();

        assert_eq!(tx.total_amount, 40_000);
        assert!(tx.is_consistent());
        assert_eq!(stock_of(&db, a).await, 48);
        assert_eq!(stock_of(&db, b).await, 29);

        let stored = db.transactions().get_by_id(tx.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, 40_000);
        assert_eq!(stored.details, tx.details);
    }

    #[tokio::test]
    async fn test_sqlite_unknown_product() {
        let (db, a, _) = sqlite_with_products().await;

        let err = db
            .checkout(StockPolicy::Enforce)
            .checkout(&[CartLineItem::new(a, 1), CartLineItem::new(9_999, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Rejected(CoreError::ProductNotFound(9_999))));
        assert_eq!(stock_of(&db, a).await, 50);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sqlite_detail_failure_rolls_back() {
        let (db, a, b) = sqlite_with_products().await;
        sqlx::query(
            "CREATE TRIGGER fail_details BEFORE INSERT ON transaction_details \
             BEGIN SELECT RAISE(ABORT, 'injected detail failure'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .checkout(StockPolicy::Enforce)
            .checkout(&[CartLineItem::new(a, 2), CartLineItem::new(b, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Storage(DbError::QueryFailed(_))));
        assert_eq!(stock_of(&db, a).await, 50);
        assert_eq!(stock_of(&db, b).await, 30);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sqlite_decrement_failure_rolls_back() {
        let (db, a, b) = sqlite_with_products().await;
        sqlx::query(&format!(
            "CREATE TRIGGER fail_decrement BEFORE UPDATE OF stock ON products \
             WHEN NEW.id = {b} \
             BEGIN SELECT RAISE(ABORT, 'injected decrement failure'); END"
        ))
        .execute(db.pool())
        .await
        .unwrap();

        // The first line's decrement has already run when the second one fails
        let err = db
            .checkout(StockPolicy::Enforce)
            .checkout(&[CartLineItem::new(a, 2), CartLineItem::new(b, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Storage(DbError::QueryFailed(_))));
        assert_eq!(stock_of(&db, a).await, 50);
        assert_eq!(stock_of(&db, b).await, 30);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sqlite_header_failure_rolls_back() {
        let (db, a, _) = sqlite_with_products().await;
        sqlx::query(
            "CREATE TRIGGER fail_header BEFORE INSERT ON transactions \
             BEGIN SELECT RAISE(ABORT, 'injected header failure'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .checkout(StockPolicy::Enforce)
            .checkout(&[CartLineItem::new(a, 5)])
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Storage(_)));
        assert_eq!(stock_of(&db, a).await, 50);
    }

    #[tokio::test]
    async fn test_sqlite_guarded_decrement() {
        let (db, a, _) = sqlite_with_products().await;

        let mut unit = db.begin().await.unwrap();
        assert!(!unit.decrement_stock(a, 51, StockPolicy::Enforce).await.unwrap());
        assert!(unit.decrement_stock(a, 50, StockPolicy::Enforce).await.unwrap());
        assert!(unit.decrement_stock(a, 1, StockPolicy::AllowNegative).await.unwrap());
        assert!(!unit.decrement_stock(9_999, 1, StockPolicy::AllowNegative).await.unwrap());
        drop(unit);

        // Dropped without commit
        assert_eq!(stock_of(&db, a).await, 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sqlite_concurrent_checkouts_all_commit() {
        let dir = TempDir::new().unwrap();
        let db = file_database(&dir).await;

        let mut ids = Vec::new();
        for n in 0..8 {
            ids.push(insert_product(&db, &format!("Teh Botol {n}"), 5_000, 1_000).await);
        }

        let service = db.checkout(StockPolicy::Enforce);
        let handles: Vec<_> = (0..40)
            .map(|i| {
                let service = service.clone();
                let id = ids[i % ids.len()];
                tokio::spawn(async move { service.checkout(&[CartLineItem::new(id, 1)]).await })
            })
            .collect();

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_ok(), "{:?}", result.err());
        }

        assert_eq!(db.transactions().count().await.unwrap(), 40);
        for id in ids {
            assert_eq!(stock_of(&db, id).await, 995);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sqlite_concurrent_checkouts_never_oversell() {
        let dir = TempDir::new().unwrap();
        let db = file_database(&dir).await;
        let gula = insert_product(&db, "Gula 1kg", 15_000, 20).await;

        let service = db.checkout(StockPolicy::Enforce);
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.checkout(&[CartLineItem::new(gula, 5)]).await })
            })
            .collect();

        let mut committed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(err) => assert!(
                    matches!(err, CheckoutError::Rejected(CoreError::InsufficientStock { .. })),
                    "{err}"
                ),
            }
        }

        assert_eq!(committed, 4);
        assert_eq!(stock_of(&db, gula).await, 0);
        assert_eq!(db.transactions().count().await.unwrap(), 4);
    }
}
