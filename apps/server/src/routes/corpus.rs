//! Corpus analysis and import endpoints

use axum::{extract::State, Json};

use vocab_core::{CorpusAnalysisResult, FrequencyAnalyzer};

use crate::error::Result;
use crate::models::*;
use crate::services::corpus::import_corpus;
use crate::AppState;

/// POST /api/corpus/analyze
pub async fn analyze(Json(request): Json<AnalyzeRequest>) -> Json<CorpusAnalysisResult> {
    let analyzer = FrequencyAnalyzer::new(request.params.to_options());
    Json(analyzer.analyze_text(&request.text))
}

/// POST /api/corpus/import
pub async fn import(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>> {
    Ok(Json(import_corpus(&state, &request).await?))
}

/// GET /api/corpus/imports
pub async fn list_imports(State(state): State<AppState>) -> Result<Json<Vec<CorpusImport>>> {
    Ok(Json(state.store.list_imports().await?))
}
