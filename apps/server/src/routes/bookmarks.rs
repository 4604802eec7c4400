//! Bookmark ("new words") endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use vocab_core::types::{WordId, WordKey};
use vocab_core::VocabularyStore;

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/bookmarks
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<BookmarkedWord>>> {
    let mut words = Vec::new();
    for bookmark in state.store.list_bookmarks().await? {
        if let Some(word) = state.store.get_word(WordKey::Id(bookmark.word_id)).await? {
            words.push(BookmarkedWord {
                word,
                added_at: bookmark.added_at,
            });
        }
    }
    Ok(Json(words))
}

/// POST /api/bookmarks/:id
pub async fn add(
    State(state): State<AppState>,
    Path(word_id): Path<WordId>,
) -> Result<Json<BookmarkStateResponse>> {
    state
        .service
        .lock()
        .await
        .bookmark(word_id, Utc::now())
        .await?;

    Ok(Json(BookmarkStateResponse {
        word_id,
        bookmarked: true,
    }))
}

/// DELETE /api/bookmarks/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(word_id): Path<WordId>,
) -> Result<Json<BookmarkStateResponse>> {
    state.service.lock().await.unbookmark(word_id).await?;

    Ok(Json(BookmarkStateResponse {
        word_id,
        bookmarked: false,
    }))
}

/// POST /api/bookmarks/:id/toggle
pub async fn toggle(
    State(state): State<AppState>,
    Path(word_id): Path<WordId>,
) -> Result<Json<BookmarkStateResponse>> {
    let bookmarked = state
        .service
        .lock()
        .await
        .toggle_bookmark(word_id, Utc::now())
        .await?;

    Ok(Json(BookmarkStateResponse {
        word_id,
        bookmarked,
    }))
}

/// DELETE /api/bookmarks
pub async fn clear(State(state): State<AppState>) -> Result<Json<ClearBookmarksResponse>> {
    let removed = state.service.lock().await.clear_bookmarks().await?;
    tracing::info!("Cleared {} bookmarks", removed);
    Ok(Json(ClearBookmarksResponse { removed }))
}
