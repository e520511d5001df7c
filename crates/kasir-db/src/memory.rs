//! # In-Memory Checkout Store
//!
//! A [`CheckoutStore`] over plain collections behind an async mutex.
//!
//! A unit holds the mutex for its whole lifetime and stages its writes
//! (touched products, new ledger rows) beside the committed state, so
//! concurrent checkouts are serialized and an uncommitted unit leaves no
//! trace. A [`FailPoint`] makes one store
//! operation fail, for exercising rollback.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use kasir_core::{Product, StockPolicy, Transaction, TransactionDetail, TransactionHeader};

use crate::error::{DbError, DbResult};
use crate::store::{CheckoutStore, CheckoutUnit};

/// Store operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    FetchProducts,
    DecrementStock,
    InsertHeader,
    InsertDetails,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: BTreeMap<i64, Product>,
    headers: BTreeMap<i64, TransactionHeader>,
    details: Vec<TransactionDetail>,
    next_transaction_id: i64,
}

/// Shared in-memory catalog and ledger.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_at: Option<FailPoint>,
}

impl MemoryStore {
    /// Creates a store holding `products`.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let state = MemoryState {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            next_transaction_id: 1,
            ..MemoryState::default()
        };
        MemoryStore {
            state: Arc::new(Mutex::new(state)),
            fail_at: None,
        }
    }

    /// Returns a handle on the same state whose units fail at `point`.
    pub fn failing_at(&self, point: FailPoint) -> Self {
        MemoryStore {
            state: Arc::clone(&self.state),
            fail_at: Some(point),
        }
    }

    /// Current stock of a product.
    pub async fn stock(&self, product_id: i64) -> Option<i64> {
        self.state.lock().await.products.get(&product_id).map(|p| p.stock)
    }

    /// Number of committed transactions.
    pub async fn transaction_count(&self) -> usize {
        self.state.lock().await.headers.len()
    }

    /// Number of committed detail rows.
    pub async fn detail_count(&self) -> usize {
        self.state.lock().await.details.len()
    }

    /// A committed transaction with its details.
    pub async fn transaction(&self, id: i64) -> Option<Transaction> {
        let state = self.state.lock().await;
        let header = state.headers.get(&id)?.clone();
        let details = state
            .details
            .iter()
            .filter(|d| d.transaction_id == id)
            .cloned()
            .collect();
        Some(Transaction::from_parts(header, details))
    }
}

/// Writes a unit has made but not yet committed.
///
/// Only touched products are copied, and ledger rows are appended on
/// commit, so a unit costs the size of its cart rather than the ledger.
#[derive(Debug, Default)]
struct Staged {
    products: HashMap<i64, Product>,
    headers: Vec<TransactionHeader>,
    details: Vec<TransactionDetail>,
}

/// A unit of work over [`MemoryStore`].
pub struct MemoryUnit {
    guard: OwnedMutexGuard<MemoryState>,
    staged: Staged,
    fail_at: Option<FailPoint>,
}

impl MemoryUnit {
    fn check(&self, point: FailPoint) -> DbResult<()> {
        if self.fail_at == Some(point) {
            return Err(DbError::QueryFailed(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }

    /// The product as this unit sees it: staged copy first, then committed state.
    fn product(&self, id: i64) -> Option<&Product> {
        self.staged.products.get(&id).or_else(|| self.guard.products.get(&id))
    }
}

#[async_trait]
impl CheckoutStore for MemoryStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> DbResult<MemoryUnit> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(MemoryUnit {
            guard,
            staged: Staged::default(),
            fail_at: self.fail_at,
        })
    }
}

#[async_trait]
impl CheckoutUnit for MemoryUnit {
    async fn fetch_products(&mut self, ids: &[i64]) -> DbResult<HashMap<i64, Product>> {
        self.check(FailPoint::FetchProducts)?;
        Ok(ids
            .iter()
            .filter_map(|id| self.product(*id))
            .map(|p| (p.id, p.clone()))
            .collect())
    }

    async fn decrement_stock(
        &mut self,
        product_id: i64,
        quantity: i64,
        policy: StockPolicy,
    ) -> DbResult<bool> {
        self.check(FailPoint::DecrementStock)?;

        let Some(current) = self.product(product_id).cloned() else {
            return Ok(false);
        };
        if !policy.allows_negative() && !current.can_sell(quantity) {
            return Ok(false);
        }

        let product = self.staged.products.entry(product_id).or_insert(current);
        product.stock -= quantity;
        Ok(true)
    }

    async fn insert_header(&mut self, total_amount: i64) -> DbResult<TransactionHeader> {
        self.check(FailPoint::InsertHeader)?;
        let id = self.guard.next_transaction_id + self.staged.headers.len() as i64;

        let header = TransactionHeader {
            id,
            total_amount,
            created_at: Utc::now(),
        };
        self.staged.headers.push(header.clone());
        Ok(header)
    }

    async fn insert_details(
        &mut self,
        transaction_id: i64,
        details: &[TransactionDetail],
    ) -> DbResult<()> {
        self.check(FailPoint::InsertDetails)?;
        if !self.staged.headers.iter().any(|h| h.id == transaction_id) {
            return Err(DbError::ForeignKeyViolation {
                message: format!("transaction {} does not exist", transaction_id),
            });
        }
        self.staged
            .details
            .extend(details.iter().cloned().map(|d| TransactionDetail {
                transaction_id,
                ..d
            }));
        Ok(())
    }

    async fn commit(mut self) -> DbResult<()> {
        self.check(FailPoint::Commit)?;

        let state = &mut *self.guard;
        state.products.extend(self.staged.products);
        state.next_transaction_id += self.staged.headers.len() as i64;
        state
            .headers
            .extend(self.staged.headers.into_iter().map(|h| (h.id, h)));
        state.details.append(&mut self.staged.details);
        Ok(())
    }
}
