//! Checkout endpoint.
//!
//! ```json
//! POST /api/checkout
//! { "items": [ { "product_id": 1, "quantity": 2 }, { "product_id": 2, "quantity": 1 } ] }
//! ```
//!
//! Responds `201` with the recorded transaction. Retrying a request that
//! succeeded records a second sale.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use kasir_core::{CartLineItem, Transaction};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/checkout", post(checkout))
}

/// Checkout request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
}

async fn checkout(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let Json(request) = body?;
    let transaction = state.checkout.checkout(&request.items).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}
