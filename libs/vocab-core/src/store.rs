//! Storage seam for words, progress, review events, the daily plan and bookmarks.
//!
//! Every operation is atomic per entity; callers never rely on cross-entity
//! transactions. A word without a progress record is simply "unseen".

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::Mutex;

use crate::error::{Result, VocabError};
use crate::types::{
    normalize_word, Bookmark, DailyPlan, NewWord, ProgressRecord, ReviewEvent, Word, WordFilter,
    WordId, WordKey,
};

/// Durable keyed storage consumed by the scheduler, the importer and the study facade.
pub trait VocabularyStore: Send + Sync {
    /// Insert a word, failing with `DuplicateWord` if its text already exists.
    fn add_word(&self, word: NewWord) -> impl Future<Output = Result<WordId>> + Send;

    fn get_word(&self, key: WordKey<'_>) -> impl Future<Output = Result<Option<Word>>> + Send;

    /// Words matching the filter, ordered by id.
    fn list_words(&self, filter: &WordFilter) -> impl Future<Output = Result<Vec<Word>>> + Send;

    /// Fill in annotations that are still empty. Returns false if the word is unknown.
    fn backfill_enrichment(
        &self,
        id: WordId,
        phonetic: &str,
        meaning: &str,
        example: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn get_progress(&self, word_id: WordId)
        -> impl Future<Output = Result<Option<ProgressRecord>>> + Send;

    fn upsert_progress(&self, record: &ProgressRecord) -> impl Future<Output = Result<()>> + Send;

    /// Progress records due at `as_of`, ordered by next review date then word id.
    fn due_progress(
        &self,
        as_of: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<ProgressRecord>>> + Send;

    fn list_progress(&self) -> impl Future<Output = Result<Vec<ProgressRecord>>> + Send;

    fn append_review_event(&self, event: &ReviewEvent) -> impl Future<Output = Result<()>> + Send;

    /// Events recorded on the given UTC date, oldest first.
    fn todays_events(&self, date: NaiveDate)
        -> impl Future<Output = Result<Vec<ReviewEvent>>> + Send;

    /// The saved plan, or the defaults if none was saved.
    fn get_daily_plan(&self) -> impl Future<Output = Result<DailyPlan>> + Send;

    fn save_plan(&self, plan: &DailyPlan) -> impl Future<Output = Result<()>> + Send;

    /// Add or refresh a bookmark.
    fn add_bookmark(
        &self,
        word_id: WordId,
        added_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a bookmark. Returns whether one existed.
    fn remove_bookmark(&self, word_id: WordId) -> impl Future<Output = Result<bool>> + Send;

    /// Bookmarks, most recent first.
    fn list_bookmarks(&self) -> impl Future<Output = Result<Vec<Bookmark>>> + Send;
}

/// UTC day boundaries `[start, end)` for a calendar date.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: WordId,
    words: Vec<Word>,
    progress: HashMap<WordId, ProgressRecord>,
    events: Vec<ReviewEvent>,
    plan: Option<DailyPlan>,
    bookmarks: Vec<Bookmark>,
}

/// In-process store, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VocabularyStore for MemoryStore {
    async fn add_word(&self, word: NewWord) -> Result<WordId> {
        let mut state = self.state.lock().await;
        let text = normalize_word(&word.text);
        if state.words.iter().any(|w| w.text == text) {
            return Err(VocabError::DuplicateWord(text));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.words.push(Word {
            id,
            text,
            phonetic: word.phonetic,
            meaning: word.meaning,
            example: word.example,
            difficulty_tier: word.difficulty_tier,
            frequency: word.frequency,
            source: word.source,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get_word(&self, key: WordKey<'_>) -> Result<Option<Word>> {
        let state = self.state.lock().await;
        let found = match key {
            WordKey::Id(id) => state.words.iter().find(|w| w.id == id),
            WordKey::Text(text) => {
                let text = normalize_word(text);
                state.words.iter().find(|w| w.text == text)
            }
        };
        Ok(found.cloned())
    }

    async fn list_words(&self, filter: &WordFilter) -> Result<Vec<Word>> {
        let state = self.state.lock().await;
        Ok(state
            .words
            .iter()
            .filter(|w| filter.matches(w))
            .cloned()
            .collect())
    }

    async fn backfill_enrichment(
        &self,
        id: WordId,
        phonetic: &str,
        meaning: &str,
        example: &str,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(word) = state.words.iter_mut().find(|w| w.id == id) else {
            return Ok(false);
        };
        for (field, value) in [
            (&mut word.phonetic, phonetic),
            (&mut word.meaning, meaning),
            (&mut word.example, example),
        ] {
            if field.is_empty() {
                *field = value.to_string();
            }
        }
        Ok(true)
    }

    async fn get_progress(&self, word_id: WordId) -> Result<Option<ProgressRecord>> {
        Ok(self.state.lock().await.progress.get(&word_id).cloned())
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<()> {
        self.state
            .lock()
            .await
            .progress
            .insert(record.word_id, record.clone());
        Ok(())
    }

    async fn due_progress(&self, as_of: DateTime<Utc>) -> Result<Vec<ProgressRecord>> {
        let state = self.state.lock().await;
        let mut due: Vec<ProgressRecord> = state
            .progress
            .values()
            .filter(|p| p.is_due(as_of))
            .cloned()
            .collect();
        due.sort_by_key(|p| (p.next_review_date, p.word_id));
        Ok(due)
    }

    async fn list_progress(&self) -> Result<Vec<ProgressRecord>> {
        let state = self.state.lock().await;
        let mut records: Vec<ProgressRecord> = state.progress.values().cloned().collect();
        records.sort_by_key(|p| p.word_id);
        Ok(records)
    }

    async fn append_review_event(&self, event: &ReviewEvent) -> Result<()> {
        self.state.lock().await.events.push(event.clone());
        Ok(())
    }

    async fn todays_events(&self, date: NaiveDate) -> Result<Vec<ReviewEvent>> {
        let (start, end) = day_bounds(date);
        let state = self.state.lock().await;
        Ok(state
            .events
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp < end)
            .cloned()
            .collect())
    }

    async fn get_daily_plan(&self) -> Result<DailyPlan> {
        Ok(self.state.lock().await.plan.clone().unwrap_or_default())
    }

    async fn save_plan(&self, plan: &DailyPlan) -> Result<()> {
        self.state.lock().await.plan = Some(plan.clone());
        Ok(())
    }

    async fn add_bookmark(&self, word_id: WordId, added_at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.bookmarks.retain(|b| b.word_id != word_id);
        state.bookmarks.push(Bookmark { word_id, added_at });
        Ok(())
    }

    async fn remove_bookmark(&self, word_id: WordId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.bookmarks.len();
        state.bookmarks.retain(|b| b.word_id != word_id);
        Ok(state.bookmarks.len() != before)
    }

    async fn list_bookmarks(&self) -> Result<Vec<Bookmark>> {
        let state = self.state.lock().await;
        let mut bookmarks = state.bookmarks.clone();
        bookmarks.sort_by(|a, b| b.added_at.cmp(&a.added_at).then(b.word_id.cmp(&a.word_id)));
        Ok(bookmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    #[tokio::test]
    async fn add_word_rejects_duplicate_text() {
        let store = MemoryStore::new();
        store.add_word(NewWord::manual("Harbor")).await.unwrap();
        let result = store.add_word(NewWord::manual("harbor")).await;
        assert!(matches!(result, Err(VocabError::DuplicateWord(text)) if text == "harbor"));
    }

    #[tokio::test]
    async fn get_word_by_id_and_text() {
        let store = MemoryStore::new();
        let id = store.add_word(NewWord::manual("lantern")).await.unwrap();
        let by_id = store.get_word(WordKey::Id(id)).await.unwrap().unwrap();
        let by_text = store.get_word(WordKey::Text("LANTERN")).await.unwrap().unwrap();
        assert_eq!(by_id, by_text);
        assert!(store.get_word(WordKey::Id(id + 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn backfill_only_fills_empty_fields() {
        let store = MemoryStore::new();
        let mut word = NewWord::manual("quay");
        word.meaning = "n. a landing place".to_string();
        let id = store.add_word(word).await.unwrap();

        assert!(store.backfill_enrichment(id, "/kiː/", "other", "Boats at the quay.").await.unwrap());
        let word = store.get_word(WordKey::Id(id)).await.unwrap().unwrap();
        assert_eq!(word.phonetic, "/kiː/");
        assert_eq!(word.meaning, "n. a landing place");
        assert_eq!(word.example, "Boats at the quay.");
        assert!(!store.backfill_enrichment(99, "", "", "").await.unwrap());
    }

    #[tokio::test]
    async fn missing_plan_returns_defaults() {
        let store = MemoryStore::new();
        assert_eq!(store.get_daily_plan().await.unwrap(), DailyPlan::default());
    }

    #[tokio::test]
    async fn bookmarks_are_listed_most_recent_first() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.add_bookmark(1, now - Duration::hours(2)).await.unwrap();
        store.add_bookmark(2, now - Duration::hours(1)).await.unwrap();
        store.add_bookmark(1, now).await.unwrap();

        let ids: Vec<WordId> = store
            .list_bookmarks()
            .await
            .unwrap()
            .iter()
            .map(|b| b.word_id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(store.remove_bookmark(2).await.unwrap());
        assert!(!store.remove_bookmark(2).await.unwrap());
    }

    #[tokio::test]
    async fn todays_events_respects_day_bounds() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let (start, end) = day_bounds(date);
        for timestamp in [start - Duration::seconds(1), start, end - Duration::seconds(1), end] {
            store
                .append_review_event(&ReviewEvent {
                    word_id: 1,
                    timestamp,
                    outcome: Outcome::Correct,
                })
                .await
                .unwrap();
        }
        assert_eq!(store.todays_events(date).await.unwrap().len(), 2);
    }
}
