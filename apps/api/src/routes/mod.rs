//! # HTTP Routes
//!
//! ```text
//! GET    /health
//! GET    /api/products?name=        POST /api/products
//! GET    /api/products/{id}         PUT  /api/products/{id}    DELETE /api/products/{id}
//! GET    /api/categories            POST /api/categories
//! GET    /api/categories/{id}       PUT  /api/categories/{id}  DELETE /api/categories/{id}
//! POST   /api/checkout
//! GET    /api/transactions/{id}
//! GET    /api/report/today
//! GET    /api/report?start_date=&end_date=
//! ```

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod categories;
pub mod checkout;
pub mod health;
pub mod products;
pub mod reports;
pub mod transactions;

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(products::routes())
        .merge(categories::routes())
        .merge(checkout::routes())
        .merge(transactions::routes())
        .merge(reports::routes());

    Router::new()
        .merge(health::routes())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
