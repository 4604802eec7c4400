//! Mastery-level review scheduling.
//!
//! Each word carries a mastery level in `0..=5` that moves one step per review:
//! up on a correct answer, down on an incorrect one. The next review is due
//! after a fixed interval picked from an ascending day table indexed by the new
//! level. An incorrect answer always schedules the word for the next day.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VocabError};
use crate::store::VocabularyStore;
use crate::types::{Outcome, ProgressRecord, ReviewEvent, WordId, WordKey, MAX_MASTERY};

/// Ascending review intervals in days, indexed by mastery level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct IntervalTable {
    days: Vec<u32>,
}

impl TryFrom<Vec<u32>> for IntervalTable {
    type Error = VocabError;

    fn try_from(days: Vec<u32>) -> Result<Self> {
        Self::new(days)
    }
}

impl From<IntervalTable> for Vec<u32> {
    fn from(table: IntervalTable) -> Self {
        table.days
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self {
            days: vec![1, 3, 7, 14, 30],
        }
    }
}

impl IntervalTable {
    /// Validate and build an interval table.
    pub fn new(days: Vec<u32>) -> Result<Self> {
        if days.is_empty() {
            return Err(VocabError::Validation("interval table is empty".to_string()));
        }
        if days.iter().any(|&d| d == 0) || days.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(VocabError::Validation(format!(
                "intervals must be positive and ascending: {:?}",
                days
            )));
        }
        Ok(Self { days })
    }

    /// Interval for a mastery level, clamped to the last entry.
    pub fn interval_for(&self, level: u8) -> Duration {
        let idx = (level as usize).min(self.days.len() - 1);
        Duration::days(i64::from(self.days[idx]))
    }
}

/// Pure state transition for one word.
#[derive(Debug, Clone, Default)]
pub struct MasterySchedule {
    pub intervals: IntervalTable,
}

impl MasterySchedule {
    pub fn new(intervals: IntervalTable) -> Self {
        Self { intervals }
    }

    /// Compute the progress record after a review.
    pub fn next(
        &self,
        previous: Option<&ProgressRecord>,
        word_id: WordId,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> ProgressRecord {
        let level = previous.map(|p| p.mastery_level.min(MAX_MASTERY)).unwrap_or(0);

        let (new_level, interval) = match outcome {
            Outcome::Correct => {
                let new_level = (level + 1).min(MAX_MASTERY);
                (new_level, self.intervals.interval_for(new_level))
            }
            Outcome::Incorrect => (level.saturating_sub(1), Duration::days(1)),
        };

        ProgressRecord {
            word_id,
            mastery_level: new_level,
            next_review_date: now + interval,
            last_review_date: now,
            total_reviews: previous.map(|p| p.total_reviews).unwrap_or(0) + 1,
        }
    }
}

/// Store-backed scheduler: records outcomes and reports due words.
pub struct ReviewScheduler<S> {
    store: Arc<S>,
    schedule: MasterySchedule,
}

impl<S: VocabularyStore> ReviewScheduler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_schedule(store, MasterySchedule::default())
    }

    pub fn with_schedule(store: Arc<S>, schedule: MasterySchedule) -> Self {
        Self { store, schedule }
    }

    /// Apply a review outcome to a word.
    ///
    /// Writes the progress record, appends the review event and, for an
    /// incorrect answer, bookmarks the word.
    pub async fn record_outcome(
        &self,
        word_id: WordId,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        if self.store.get_word(WordKey::Id(word_id)).await?.is_none() {
            return Err(VocabError::WordNotFound(word_id));
        }

        let previous = self.store.get_progress(word_id).await?;
        let record = self.schedule.next(previous.as_ref(), word_id, outcome, now);

        self.store.upsert_progress(&record).await?;
        self.store
            .append_review_event(&ReviewEvent {
                word_id,
                timestamp: now,
                outcome,
            })
            .await?;

        if outcome == Outcome::Incorrect {
            self.store.add_bookmark(word_id, now).await?;
        }

        tracing::debug!(
            word_id,
            level = record.mastery_level,
            next = %record.next_review_date,
            "recorded review"
        );
        Ok(record)
    }

    /// Ids of words due at `as_of`, earliest due first.
    pub async fn due_words(&self, as_of: DateTime<Utc>) -> Result<Vec<WordId>> {
        Ok(self
            .store
            .due_progress(as_of)
            .await?
            .into_iter()
            .map(|p| p.word_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::NewWord;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn record(level: u8, at: DateTime<Utc>) -> ProgressRecord {
        ProgressRecord {
            word_id: 1,
            mastery_level: level,
            next_review_date: at,
            last_review_date: at,
            total_reviews: 4,
        }
    }

    #[test]
    fn first_correct_answer_reaches_level_one() {
        let schedule = MasterySchedule::default();
        let now = now();
        let next = schedule.next(None, 1, Outcome::Correct, now);
        assert_eq!(next.mastery_level, 1);
        assert_eq!(next.next_review_date, now + Duration::days(3));
        assert_eq!(next.last_review_date, now);
        assert_eq!(next.total_reviews, 1);
    }

    #[test]
    fn incorrect_at_level_zero_stays_zero() {
        let schedule = MasterySchedule::default();
        let now = now();
        let next = schedule.next(Some(&record(0, now)), 1, Outcome::Incorrect, now);
        assert_eq!(next.mastery_level, 0);
        assert_eq!(next.next_review_date, now + Duration::days(1));
        assert_eq!(next.total_reviews, 5);
    }

    #[test]
    fn incorrect_drops_one_level_and_resets_interval() {
        let schedule = MasterySchedule::default();
        let now = now();
        let next = schedule.next(Some(&record(4, now)), 1, Outcome::Incorrect, now);
        assert_eq!(next.mastery_level, 3);
        assert_eq!(next.next_review_date, now + Duration::days(1));
    }

    #[test]
    fn mastery_caps_at_five() {
        let schedule = MasterySchedule::default();
        let now = now();
        let mut current: Option<ProgressRecord> = None;
        for _ in 0..7 {
            current = Some(schedule.next(current.as_ref(), 1, Outcome::Correct, now));
        }
        let last = current.unwrap();
        assert_eq!(last.mastery_level, MAX_MASTERY);
        assert_eq!(last.next_review_date, now + Duration::days(30));
        assert_eq!(last.total_reviews, 7);
    }

    #[test]
    fn next_review_never_precedes_last_review() {
        let schedule = MasterySchedule::default();
        let now = now();
        for level in 0..=MAX_MASTERY {
            for outcome in [Outcome::Correct, Outcome::Incorrect] {
                let next = schedule.next(Some(&record(level, now)), 1, outcome, now);
                assert!(next.next_review_date >= next.last_review_date);
                assert!(next.mastery_level <= MAX_MASTERY);
            }
        }
    }

    #[test]
    fn interval_table_validation() {
        assert!(IntervalTable::new(vec![]).is_err());
        assert!(IntervalTable::new(vec![3, 1]).is_err());
        assert!(IntervalTable::new(vec![0, 1]).is_err());
        let table = IntervalTable::new(vec![2, 4]).unwrap();
        assert_eq!(table.interval_for(9), Duration::days(4));
    }

    #[test]
    fn interval_table_deserializes_through_validation() {
        let table: IntervalTable = serde_json::from_str("[2, 4]").unwrap();
        assert_eq!(table, IntervalTable::new(vec![2, 4]).unwrap());
        assert_eq!(serde_json::to_string(&table).unwrap(), "[2,4]");

        assert!(serde_json::from_str::<IntervalTable>("[]").is_err());
        assert!(serde_json::from_str::<IntervalTable>("[5, 1]").is_err());
    }

    #[tokio::test]
    async fn record_outcome_persists_progress_event_and_bookmark() {
        let store = Arc::new(MemoryStore::new());
        let id = store.add_word(NewWord::manual("harbor")).await.unwrap();
        let scheduler = ReviewScheduler::new(store.clone());
        let now = now();

        let record = scheduler.record_outcome(id, Outcome::Incorrect, now).await.unwrap();
        assert_eq!(record.mastery_level, 0);
        assert_eq!(store.get_progress(id).await.unwrap(), Some(record));
        assert_eq!(store.todays_events(now.date_naive()).await.unwrap().len(), 1);
        assert_eq!(store.list_bookmarks().await.unwrap()[0].word_id, id);
    }

    #[tokio::test]
    async fn correct_answer_does_not_bookmark() {
        let store = Arc::new(MemoryStore::new());
        let id = store.add_word(NewWord::manual("harbor")).await.unwrap();
        let scheduler = ReviewScheduler::new(store.clone());

        scheduler.record_outcome(id, Outcome::Correct, now()).await.unwrap();
        assert!(store.list_bookmarks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_outcome_rejects_unknown_word() {
        let store = Arc::new(MemoryStore::new());
        let scheduler = ReviewScheduler::new(store);
        let result = scheduler.record_outcome(42, Outcome::Correct, now()).await;
        assert!(matches!(result, Err(VocabError::WordNotFound(42))));
    }

    #[tokio::test]
    async fn due_words_excludes_unseen_and_future() {
        let store = Arc::new(MemoryStore::new());
        let seen = store.add_word(NewWord::manual("harbor")).await.unwrap();
        let later = store.add_word(NewWord::manual("lantern")).await.unwrap();
        let _unseen = store.add_word(NewWord::manual("quay")).await.unwrap();
        let scheduler = ReviewScheduler::new(store.clone());
        let now = now();

        scheduler.record_outcome(seen, Outcome::Incorrect, now).await.unwrap();
        scheduler.record_outcome(later, Outcome::Correct, now).await.unwrap();

        assert!(scheduler.due_words(now).await.unwrap().is_empty());
        assert_eq!(
            scheduler.due_words(now + Duration::days(1)).await.unwrap(),
            vec![seen]
        );
        assert_eq!(
            scheduler.due_words(now + Duration::days(3)).await.unwrap(),
            vec![seen, later]
        );
    }
}
