//! SQLite database operations

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use vocab_core::store::day_bounds;
use vocab_core::types::{
    normalize_word, Bookmark, DailyPlan, NewWord, ProgressRecord, ReviewEvent, Word, WordFilter,
    WordId, WordKey,
};
use vocab_core::{VocabError, VocabularyStore};

use crate::error::{ApiError, Result};
use crate::models::*;

const WORD_COLUMNS: &str =
    "id, text, phonetic, meaning, example, difficulty_tier, frequency, source, created_at";

const PROGRESS_COLUMNS: &str =
    "word_id, mastery_level, next_review_date, last_review_date, total_reviews";

/// Durable vocabulary store backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to SQLite, creating the database file if needed
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Private in-memory database on a single long-lived connection
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === Corpus Imports ===

    /// Record a finished import
    pub async fn record_import(&self, import: &NewCorpusImport) -> Result<CorpusImport> {
        let record = sqlx::query_as::<_, CorpusImport>(
            r#"
            INSERT INTO corpus_imports
                (title, content_hash, total_tokens, unique_tokens, candidates,
                 saved, skipped, failed, imported_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING id, title, content_hash, total_tokens, unique_tokens, candidates,
                      saved, skipped, failed, imported_at
            "#,
        )
        .bind(&import.title)
        .bind(&import.content_hash)
        .bind(import.total_tokens as i64)
        .bind(import.unique_tokens as i64)
        .bind(import.candidates as i64)
        .bind(import.summary.succeeded as i64)
        .bind(import.summary.skipped as i64)
        .bind(import.summary.failed as i64)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// All imports, newest first
    pub async fn list_imports(&self) -> Result<Vec<CorpusImport>> {
        let imports = sqlx::query_as::<_, CorpusImport>(
            r#"
            SELECT id, title, content_hash, total_tokens, unique_tokens, candidates,
                   saved, skipped, failed, imported_at
            FROM corpus_imports
            ORDER BY imported_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(imports)
    }

    /// Number of earlier imports of the same text
    pub async fn count_imports_with_hash(&self, content_hash: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM corpus_imports WHERE content_hash = ?1")
                .bind(content_hash)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

fn storage(e: sqlx::Error) -> VocabError {
    VocabError::Storage(e.to_string())
}

/// LIKE pattern for a case-insensitive substring search
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl VocabularyStore for SqliteStore {
    async fn add_word(&self, word: NewWord) -> vocab_core::Result<WordId> {
        let text = normalize_word(&word.text);
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO words
                (text, phonetic, meaning, example, difficulty_tier, frequency, source, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING id
            "#,
        )
        .bind(&text)
        .bind(&word.phonetic)
        .bind(&word.meaning)
        .bind(&word.example)
        .bind(i64::from(word.difficulty_tier))
        .bind(i64::from(word.frequency.max(1)))
        .bind(word.source.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(VocabError::DuplicateWord(text))
            }
            Err(e) => Err(storage(e)),
        }
    }

    async fn get_word(&self, key: WordKey<'_>) -> vocab_core::Result<Option<Word>> {
        let row = match key {
            WordKey::Id(id) => {
                sqlx::query_as::<_, WordRow>(&format!(
                    "SELECT {} FROM words WHERE id = ?1",
                    WORD_COLUMNS
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
            }
            WordKey::Text(text) => {
                sqlx::query_as::<_, WordRow>(&format!(
                    "SELECT {} FROM words WHERE text = ?1",
                    WORD_COLUMNS
                ))
                .bind(normalize_word(text))
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(storage)?;

        row.map(WordRow::into_word).transpose()
    }

    async fn list_words(&self, filter: &WordFilter) -> vocab_core::Result<Vec<Word>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let rows = sqlx::query_as::<_, WordRow>(&format!(
            r#"
            SELECT {}
            FROM words
            WHERE (?1 IS NULL OR difficulty_tier = ?1)
              AND (?2 IS NULL OR source = ?2)
              AND (?3 IS NULL
                   OR lower(text) LIKE ?3 ESCAPE '\'
                   OR lower(meaning) LIKE ?3 ESCAPE '\')
            ORDER BY id
            "#,
            WORD_COLUMNS
        ))
        .bind(filter.tier.map(i64::from))
        .bind(filter.source.map(|s| s.as_str()))
        .bind(search)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter().map(WordRow::into_word).collect()
    }

    async fn backfill_enrichment(
        &self,
        id: WordId,
        phonetic: &str,
        meaning: &str,
        example: &str,
    ) -> vocab_core::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE words
            SET phonetic = CASE WHEN phonetic = '' THEN ?2 ELSE phonetic END,
                meaning = CASE WHEN meaning = '' THEN ?3 ELSE meaning END,
                example = CASE WHEN example = '' THEN ?4 ELSE example END
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(phonetic)
        .bind(meaning)
        .bind(example)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_progress(&self, word_id: WordId) -> vocab_core::Result<Option<ProgressRecord>> {
        let row = sqlx::query_as::<_, ProgressRow>(&format!(
            "SELECT {} FROM progress WHERE word_id = ?1",
            PROGRESS_COLUMNS
        ))
        .bind(word_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        Ok(row.map(ProgressRow::into_record))
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> vocab_core::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO progress
                (word_id, mastery_level, next_review_date, last_review_date, total_reviews)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (word_id) DO UPDATE SET
                mastery_level = excluded.mastery_level,
                next_review_date = excluded.next_review_date,
                last_review_date = excluded.last_review_date,
                total_reviews = excluded.total_reviews
            "#,
        )
        .bind(record.word_id)
        .bind(i64::from(record.mastery_level))
        .bind(record.next_review_date)
        .bind(record.last_review_date)
        .bind(i64::from(record.total_reviews))
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn due_progress(&self, as_of: DateTime<Utc>) -> vocab_core::Result<Vec<ProgressRecord>> {
        let rows = sqlx::query_as::<_, ProgressRow>(&format!(
            r#"
            SELECT {}
            FROM progress
            WHERE next_review_date <= ?1
            ORDER BY next_review_date, word_id
            "#,
            PROGRESS_COLUMNS
        ))
        .bind(as_of)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(ProgressRow::into_record).collect())
    }

    async fn list_progress(&self) -> vocab_core::Result<Vec<ProgressRecord>> {
        let rows = sqlx::query_as::<_, ProgressRow>(&format!(
            "SELECT {} FROM progress ORDER BY word_id",
            PROGRESS_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(ProgressRow::into_record).collect())
    }

    async fn append_review_event(&self, event: &ReviewEvent) -> vocab_core::Result<()> {
        sqlx::query("INSERT INTO review_events (word_id, reviewed_at, outcome) VALUES (?1, ?2, ?3)")
            .bind(event.word_id)
            .bind(event.timestamp)
            .bind(outcome_str(event.outcome))
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(())
    }

    async fn todays_events(&self, date: NaiveDate) -> vocab_core::Result<Vec<ReviewEvent>> {
        let (start, end) = day_bounds(date);
        let rows = sqlx::query_as::<_, ReviewEventRow>(
            r#"
            SELECT word_id, reviewed_at, outcome
            FROM review_events
            WHERE reviewed_at >= ?1 AND reviewed_at < ?2
            ORDER BY reviewed_at, id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(ReviewEventRow::into_event).collect())
    }

    async fn get_daily_plan(&self) -> vocab_core::Result<DailyPlan> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT daily_goal, review_goal, study_time, notifications_enabled
            FROM daily_plan
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        Ok(row.map(PlanRow::into_plan).unwrap_or_default())
    }

    async fn save_plan(&self, plan: &DailyPlan) -> vocab_core::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_plan (id, daily_goal, review_goal, study_time, notifications_enabled)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                daily_goal = excluded.daily_goal,
                review_goal = excluded.review_goal,
                study_time = excluded.study_time,
                notifications_enabled = excluded.notifications_enabled
            "#,
        )
        .bind(i64::from(plan.daily_goal))
        .bind(i64::from(plan.review_goal))
        .bind(plan.study_time.as_str())
        .bind(plan.notifications_enabled)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn add_bookmark(
        &self,
        word_id: WordId,
        added_at: DateTime<Utc>,
    ) -> vocab_core::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookmarks (word_id, added_at)
            VALUES (?1, ?2)
            ON CONFLICT (word_id) DO UPDATE SET added_at = excluded.added_at
            "#,
        )
        .bind(word_id)
        .bind(added_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn remove_bookmark(&self, word_id: WordId) -> vocab_core::Result<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE word_id = ?1")
            .bind(word_id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_bookmarks(&self) -> vocab_core::Result<Vec<Bookmark>> {
        let rows = sqlx::query_as::<_, BookmarkRow>(
            "SELECT word_id, added_at FROM bookmarks ORDER BY added_at DESC, word_id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(Bookmark::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use vocab_core::types::{Outcome, StudyTimeWindow, WordSource};

    async fn store() -> SqliteStore {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        store.run_migrations().await.unwrap();
        store
    }

    fn corpus_word(text: &str, tier: u8, meaning: &str) -> NewWord {
        NewWord {
            text: text.to_string(),
            phonetic: String::new(),
            meaning: meaning.to_string(),
            example: String::new(),
            difficulty_tier: tier,
            frequency: 4,
            source: WordSource::Corpus,
        }
    }

    #[tokio::test]
    async fn duplicate_text_is_reported() {
        let store = store().await;
        store.add_word(NewWord::manual("harbor")).await.unwrap();
        let result = store.add_word(NewWord::manual("HARBOR")).await;
        assert!(matches!(result, Err(VocabError::DuplicateWord(text)) if text == "harbor"));
    }

    #[tokio::test]
    async fn list_words_applies_filter() {
        let store = store().await;
        store.add_word(corpus_word("harbor", 4, "n. a sheltered port")).await.unwrap();
        store.add_word(corpus_word("quay", 5, "n. a landing place")).await.unwrap();
        store.add_word(NewWord::manual("lantern")).await.unwrap();

        let by_meaning = store
            .list_words(&WordFilter {
                search: Some("PORT".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_meaning.len(), 1);
        assert_eq!(by_meaning[0].text, "harbor");

        let corpus = store
            .list_words(&WordFilter {
                source: Some(WordSource::Corpus),
                tier: Some(5),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].text, "quay");

        let all = store.list_words(&WordFilter::default()).await.unwrap();
        let texts: Vec<&str> = all.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["harbor", "quay", "lantern"]);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let store = store().await;
        store.add_word(NewWord::manual("harbor")).await.unwrap();
        let found = store
            .list_words(&WordFilter {
                search: Some("%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn progress_upsert_and_due_order() {
        let store = store().await;
        let a = store.add_word(NewWord::manual("harbor")).await.unwrap();
        let b = store.add_word(NewWord::manual("quay")).await.unwrap();
        let now = Utc::now();

        for (id, offset) in [(a, 2), (b, 1)] {
            store
                .upsert_progress(&ProgressRecord {
                    word_id: id,
                    mastery_level: 1,
                    next_review_date: now + Duration::days(offset),
                    last_review_date: now,
                    total_reviews: 1,
                })
                .await
                .unwrap();
        }

        let due: Vec<WordId> = store
            .due_progress(now + Duration::days(3))
            .await
            .unwrap()
            .iter()
            .map(|p| p.word_id)
            .collect();
        assert_eq!(due, vec![b, a]);
        assert!(store.due_progress(now).await.unwrap().is_empty());

        let mut record = store.get_progress(a).await.unwrap().unwrap();
        record.mastery_level = 3;
        store.upsert_progress(&record).await.unwrap();
        assert_eq!(store.get_progress(a).await.unwrap().unwrap().mastery_level, 3);
        assert_eq!(store.list_progress().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn plan_round_trips_and_defaults() {
        let store = store().await;
        assert_eq!(store.get_daily_plan().await.unwrap(), DailyPlan::default());

        let plan = DailyPlan {
            daily_goal: 35,
            review_goal: 10,
            study_time: StudyTimeWindow::Morning,
            notifications_enabled: true,
        };
        store.save_plan(&plan).await.unwrap();
        store.save_plan(&plan).await.unwrap();
        assert_eq!(store.get_daily_plan().await.unwrap(), plan);
    }

    #[tokio::test]
    async fn bookmarks_refresh_and_order() {
        let store = store().await;
        let a = store.add_word(NewWord::manual("harbor")).await.unwrap();
        let b = store.add_word(NewWord::manual("quay")).await.unwrap();
        let now = Utc::now();

        store.add_bookmark(a, now - Duration::hours(2)).await.unwrap();
        store.add_bookmark(b, now - Duration::hours(1)).await.unwrap();
        store.add_bookmark(a, now).await.unwrap();

        let ids: Vec<WordId> = store
            .list_bookmarks()
            .await
            .unwrap()
            .iter()
            .map(|b| b.word_id)
            .collect();
        assert_eq!(ids, vec![a, b]);
        assert!(store.remove_bookmark(a).await.unwrap());
        assert!(!store.remove_bookmark(a).await.unwrap());
    }

    #[tokio::test]
    async fn events_are_bucketed_by_day() {
        let store = store().await;
        let id = store.add_word(NewWord::manual("harbor")).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let (start, end) = day_bounds(date);

        for timestamp in [start - Duration::seconds(1), start, end - Duration::seconds(1), end] {
            store
                .append_review_event(&ReviewEvent {
                    word_id: id,
                    timestamp,
                    outcome: Outcome::Incorrect,
                })
                .await
                .unwrap();
        }

        let events = store.todays_events(date).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].outcome, Outcome::Incorrect);
    }

    #[tokio::test]
    async fn backfill_keeps_existing_annotations() {
        let store = store().await;
        let id = store
            .add_word(corpus_word("quay", 5, "n. a landing place"))
            .await
            .unwrap();
        assert!(store
            .backfill_enrichment(id, "/kiː/", "other", "Boats at the quay.")
            .await
            .unwrap());

        let word = store.get_word(WordKey::Text("quay")).await.unwrap().unwrap();
        assert_eq!(word.phonetic, "/kiː/");
        assert_eq!(word.meaning, "n. a landing place");
        assert!(!store.backfill_enrichment(id + 1, "", "", "").await.unwrap());
    }

    #[tokio::test]
    async fn imports_are_recorded() {
        let store = store().await;
        let import = NewCorpusImport {
            title: "Chapter 1".to_string(),
            content_hash: "abc".to_string(),
            total_tokens: 10,
            unique_tokens: 6,
            candidates: 4,
            summary: Default::default(),
        };
        let record = store.record_import(&import).await.unwrap();
        assert_eq!(record.title, "Chapter 1");
        assert_eq!(store.count_imports_with_hash("abc").await.unwrap(), 1);
        assert_eq!(store.list_imports().await.unwrap().len(), 1);
    }
}
