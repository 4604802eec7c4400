//! Daily plan endpoints

use axum::{extract::State, Json};

use vocab_core::DailyPlan;

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/plan
pub async fn get(State(state): State<AppState>) -> Result<Json<DailyPlan>> {
    Ok(Json(state.service.lock().await.plan().await?))
}

/// PUT /api/plan
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<DailyPlan>> {
    let saved = state
        .service
        .lock()
        .await
        .save_plan(&request.to_plan())
        .await?;

    tracing::info!(
        "Saved plan: {} words/day, {} reviews/day",
        saved.daily_goal,
        saved.review_goal
    );
    Ok(Json(saved))
}
