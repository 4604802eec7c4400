//! Corpus import pipeline: analyze, enrich, save, record.

use sha2::{Digest, Sha256};

use vocab_core::types::WordSource;
use vocab_core::{import_candidates, import_words, FrequencyAnalyzer};

use crate::error::{ApiError, Result};
use crate::models::{ImportRequest, ImportResponse, NewCorpusImport};
use crate::AppState;

const MAX_TITLE_CHARS: usize = 60;

/// Calculate SHA256 hash of content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Use the given title, else the first non-empty line of the text.
pub fn derive_title(title: Option<&str>, text: &str) -> String {
    let source = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| text.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("Untitled");
    source.chars().take(MAX_TITLE_CHARS).collect()
}

pub async fn import_corpus(state: &AppState, request: &ImportRequest) -> Result<ImportResponse> {
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text is empty".to_string()));
    }

    let content_hash = hash_content(&request.text);
    let earlier = state.store.count_imports_with_hash(&content_hash).await?;
    if earlier > 0 {
        tracing::info!("Text {} was imported {} time(s) before", content_hash, earlier);
    }

    let analysis = FrequencyAnalyzer::new(request.params.to_options()).analyze_text(&request.text);

    let (report, enrichment) = if request.enrich {
        let batch = state
            .enricher
            .enrich_batch(&analysis.candidate_word_list, |current, total, word| {
                tracing::debug!(current, total, word, "enriched");
            })
            .await;
        let report = import_words(state.store.as_ref(), &batch.words, WordSource::Corpus).await;
        (report, Some(batch.report.summary()))
    } else {
        let report = import_candidates(
            state.store.as_ref(),
            &analysis.candidate_word_list,
            WordSource::Corpus,
        )
        .await;
        (report, None)
    };
    let summary = report.summary();

    let import = state
        .store
        .record_import(&NewCorpusImport {
            title: derive_title(request.title.as_deref(), &request.text),
            content_hash,
            total_tokens: analysis.total_tokens,
            unique_tokens: analysis.unique_tokens,
            candidates: analysis.candidate_word_list.len(),
            summary,
        })
        .await?;

    tracing::info!(
        "Imported {:?}: {} saved, {} skipped, {} failed",
        import.title,
        summary.succeeded,
        summary.skipped,
        summary.failed
    );

    Ok(ImportResponse {
        import,
        analysis,
        enrichment,
        summary,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_content() {
        let hash = hash_content("test content");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_content("test content"));
        assert_ne!(hash, hash_content("other content"));
    }

    #[test]
    fn test_title_prefers_explicit() {
        assert_eq!(derive_title(Some("  Moby Dick "), "Call me Ishmael."), "Moby Dick");
    }

    #[test]
    fn test_title_from_first_line() {
        assert_eq!(derive_title(None, "\n\n  Chapter 1\nIt was"), "Chapter 1");
        assert_eq!(derive_title(Some(""), "   "), "Untitled");
    }

    #[test]
    fn test_title_is_truncated() {
        let long = "x".repeat(200);
        assert_eq!(derive_title(None, &long).chars().count(), MAX_TITLE_CHARS);
    }
}
