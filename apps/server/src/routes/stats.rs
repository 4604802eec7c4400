//! Progress statistics endpoints

use axum::{extract::State, Json};
use chrono::Utc;

use vocab_core::DailySummary;

use crate::error::Result;
use crate::AppState;

/// GET /api/stats/today
pub async fn today(State(state): State<AppState>) -> Result<Json<DailySummary>> {
    let now = Utc::now();
    let summary = state
        .service
        .lock()
        .await
        .daily_summary(now.date_naive(), now)
        .await?;

    Ok(Json(summary))
}
