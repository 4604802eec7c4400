//! Vocabulary endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use vocab_core::types::{NewWord, Word, WordFilter, WordId, WordKey, WordSource};
use vocab_core::VocabularyStore;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// Tier given to manually added words when none is specified
const DEFAULT_MANUAL_TIER: u8 = 3;

/// GET /api/words
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<WordListQuery>,
) -> Result<Json<Vec<WordListItem>>> {
    let source = match query.source.as_deref() {
        Some(raw) => Some(
            WordSource::from_str(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown source {:?}", raw)))?,
        ),
        None => None,
    };

    let filter = WordFilter {
        tier: query.tier,
        source,
        search: query.search,
    };

    let mastery: HashMap<WordId, u8> = state
        .store
        .list_progress()
        .await?
        .into_iter()
        .map(|p| (p.word_id, p.mastery_level))
        .collect();

    let items = state
        .store
        .list_words(&filter)
        .await?
        .into_iter()
        .map(|word| WordListItem {
            mastery_level: mastery.get(&word.id).copied().unwrap_or(0),
            word,
        })
        .collect();

    Ok(Json(items))
}

/// POST /api/words
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateWordRequest>,
) -> Result<(StatusCode, Json<Word>)> {
    let mut word = NewWord::manual(&request.word);
    if word.text.is_empty() {
        return Err(ApiError::BadRequest("word is empty".to_string()));
    }

    let tier = request.difficulty_tier.unwrap_or(DEFAULT_MANUAL_TIER);
    if !(1..=5).contains(&tier) {
        return Err(ApiError::BadRequest(format!(
            "difficulty_tier must be between 1 and 5, got {}",
            tier
        )));
    }

    word.phonetic = request.phonetic.trim().to_string();
    word.meaning = request.meaning.trim().to_string();
    word.example = request.example.trim().to_string();
    word.difficulty_tier = tier;

    let id = state.store.add_word(word).await?;
    let created = state
        .store
        .get_word(WordKey::Id(id))
        .await?
        .ok_or_else(|| ApiError::Internal(format!("word {} vanished after insert", id)))?;

    tracing::info!("Added word {:?}", created.text);
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/words/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<WordId>,
) -> Result<Json<WordDetailResponse>> {
    let word = state
        .store
        .get_word(WordKey::Id(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("word {}", id)))?;
    let progress = state.store.get_progress(id).await?;
    let bookmarked = state
        .store
        .list_bookmarks()
        .await?
        .iter()
        .any(|b| b.word_id == id);

    Ok(Json(WordDetailResponse {
        word,
        progress,
        bookmarked,
    }))
}
