//! Study session endpoints

use axum::{extract::State, Json};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vocab_core::{AnswerOutcome, SessionView, VocabError};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// POST /api/study/start
pub async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<SessionView>> {
    let mut rng = match request.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let view = state
        .service
        .lock()
        .await
        .start_session(request.kind, Utc::now(), &mut rng)
        .await?;

    Ok(Json(view))
}

/// GET /api/study/current
pub async fn current(State(state): State<AppState>) -> Result<Json<SessionView>> {
    let view = state
        .service
        .lock()
        .await
        .session()
        .ok_or(VocabError::NoActiveSession)?;

    Ok(Json(view))
}

/// POST /api/study/answer
pub async fn answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerOutcome>> {
    let outcome = state
        .service
        .lock()
        .await
        .answer(request.word_id, request.correct, Utc::now())
        .await?;

    Ok(Json(outcome))
}
