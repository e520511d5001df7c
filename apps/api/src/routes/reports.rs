//! Sales report endpoints.
//!
//! Dates are UTC calendar days. `/api/report?start_date=2026-10-01&end_date=2026-10-17`
//! covers both days in full.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use kasir_core::{ReportRange, SalesReport, ValidationError};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/report/today", get(today_report))
        .route("/report", get(range_report))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

async fn today_report(State(state): State<Arc<AppState>>) -> ApiResult<Json<SalesReport>> {
    let range = ReportRange::day(Utc::now().date_naive())?;
    Ok(Json(state.db.reports().sales_report(range).await?))
}

async fn range_report(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Json<SalesReport>> {
    let Query(query) = query?;

    let start = query.start_date.ok_or_else(|| required("start_date"))?;
    let end = query.end_date.ok_or_else(|| required("end_date"))?;
    let range = ReportRange::dates(start, end)?;

    Ok(Json(state.db.reports().sales_report(range).await?))
}

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Days, Utc};
    use serde_json::{json, Value};

    use crate::routes::test_support::{send, test_app};

    #[tokio::test]
    async fn test_today_report() {
        let (app, _) = test_app().await;

        let (_, empty) = send(&app, "GET", "/api/report/today", None).await;
        assert_eq!(empty["total_transactions"], 0);
        assert_eq!(empty["best_selling_product"], Value::Null);

        let (_, aqua) = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({ "name": "Aqua 600ml", "price": 4000, "stock": 24 })),
        )
        .await;
        let (_, teh) = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({ "name": "Teh Botol", "price": 5000, "stock": 24 })),
        )
        .await;

        send(
            &app,
            "POST",
            "/api/checkout",
            Some(json!({ "items": [
                { "product_id": aqua["id"], "quantity": 3 },
                { "product_id": teh["id"], "quantity": 1 }
            ] })),
        )
        .await;

        let (status, report) = send(&app, "GET", "/api/report/today", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["total_revenue"], 17_000);
        assert_eq!(report["total_transactions"], 1);
        assert_eq!(report["best_selling_product"]["name"], "Aqua 600ml");
        assert_eq!(report["best_selling_product"]["quantity_sold"], 3);
    }

    #[tokio::test]
    async fn test_range_report_validation() {
        let (app, _) = test_app().await;

        let (status, _) = send(&app, "GET", "/api/report?start_date=2026-10-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "GET",
            "/api/report?start_date=2026-10-17&end_date=2026-10-01",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "GET",
            "/api/report?start_date=kemarin&end_date=2026-10-01",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_range_report_covers_whole_days() {
        let (app, _) = test_app().await;
        let (_, product) = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({ "name": "Kopi", "price": 2500, "stock": 10 })),
        )
        .await;
        send(
            &app,
            "POST",
            "/api/checkout",
            Some(json!({ "items": [{ "product_id": product["id"], "quantity": 2 }] })),
        )
        .await;

        let today = Utc::now().date_naive();
        let week_ago = today.checked_sub_days(Days::new(7)).unwrap();

        let (status, report) = send(
            &app,
            "GET",
            &format!("/api/report?start_date={week_ago}&end_date={today}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["total_revenue"], 5_000);

        let (_, before) = send(
            &app,
            "GET",
            &format!("/api/report?start_date={week_ago}&end_date={week_ago}"),
            None,
        )
        .await;
        assert_eq!(before["total_transactions"], 0);
    }
}
