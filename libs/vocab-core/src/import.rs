//! Saving candidate words into the store.

use crate::enrichment::EnrichedWord;
use crate::error::VocabError;
use crate::report::{BatchReport, ItemStatus};
use crate::store::VocabularyStore;
use crate::types::{normalize_word, CandidateWord, NewWord, WordKey, WordSource};

/// Add every word not already in the store, one report item per input.
///
/// Existing words are skipped and keep their tier and frequency; only their
/// empty annotations are backfilled from successful lookups. Store failures
/// are recorded per item and never stop the batch.
pub async fn import_words<S: VocabularyStore>(
    store: &S,
    words: &[EnrichedWord],
    source: WordSource,
) -> BatchReport {
    let mut report = BatchReport::default();

    for word in words {
        let text = normalize_word(&word.text);
        if text.is_empty() {
            report.push(&word.text, ItemStatus::Failed, Some("empty word".to_string()));
            continue;
        }

        match store.get_word(WordKey::Text(&text)).await {
            Ok(Some(existing)) => {
                if word.status == ItemStatus::Success {
                    if let Err(e) = store
                        .backfill_enrichment(
                            existing.id,
                            &word.phonetic,
                            &word.meaning,
                            &word.example,
                        )
                        .await
                    {
                        tracing::warn!("backfill for {:?} failed: {}", text, e);
                    }
                }
                report.push(&text, ItemStatus::Skipped, Some("already saved".to_string()));
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("could not check {:?}: {}", text, e);
                report.push(&text, ItemStatus::Failed, Some(e.to_string()));
                continue;
            }
        }

        let new_word = NewWord {
            text: text.clone(),
            phonetic: word.phonetic.clone(),
            meaning: word.meaning.clone(),
            example: word.example.clone(),
            difficulty_tier: word.tier,
            frequency: word.frequency.max(1),
            source,
        };

        match store.add_word(new_word).await {
            Ok(_) => report.push(&text, ItemStatus::Success, None),
            Err(VocabError::DuplicateWord(_)) => {
                report.push(&text, ItemStatus::Skipped, Some("already saved".to_string()))
            }
            Err(e) => {
                tracing::warn!("could not save {:?}: {}", text, e);
                report.push(&text, ItemStatus::Failed, Some(e.to_string()));
            }
        }
    }

    let summary = report.summary();
    tracing::info!(
        saved = summary.succeeded,
        skipped = summary.skipped,
        failed = summary.failed,
        "import finished"
    );
    report
}

/// Import candidates without dictionary annotations.
pub async fn import_candidates<S: VocabularyStore>(
    store: &S,
    candidates: &[CandidateWord],
    source: WordSource,
) -> BatchReport {
    let words: Vec<EnrichedWord> = candidates.iter().map(EnrichedWord::unenriched).collect();
    import_words(store, &words, source).await
}
