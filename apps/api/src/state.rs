//! Shared application state.

use std::sync::Arc;

use kasir_core::StockPolicy;
use kasir_db::{CheckoutService, Database};

/// State shared by all handlers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub checkout: CheckoutService<Database>,
}

impl AppState {
    pub fn new(db: Database, policy: StockPolicy) -> Arc<Self> {
        let checkout = db.checkout(policy);
        Arc::new(AppState { db, checkout })
    }
}
