//! Study facade used by the presentation layer.
//!
//! Holds the store, the scheduler and at most one active session. Callers
//! issue commands and read back plain values.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::composer::{compose_today, SessionQueue};
use crate::error::{Result, VocabError};
use crate::scheduler::ReviewScheduler;
use crate::stats::DailySummary;
use crate::store::VocabularyStore;
use crate::types::{
    DailyPlan, Outcome, ProgressRecord, Word, WordFilter, WordId, WordKey, WordSnapshot,
};

/// What a session is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionKind {
    /// Due reviews plus new words, under the daily plan.
    Daily,
    /// Every due word.
    Review,
    /// Bookmarked words, most recent first.
    Bookmarks,
    Single { word_id: WordId },
}

#[derive(Debug, Clone)]
pub struct StudySession {
    pub id: Uuid,
    pub kind: SessionKind,
    pub started_at: DateTime<Utc>,
    pub queue: SessionQueue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub kind: SessionKind,
    pub position: usize,
    pub total: usize,
    pub remaining: usize,
    pub current: Option<WordSnapshot>,
    pub finished: bool,
}

impl SessionView {
    fn of(session: &StudySession) -> Self {
        Self {
            session_id: session.id,
            kind: session.kind,
            position: session.queue.position(),
            total: session.queue.len(),
            remaining: session.queue.remaining(),
            current: session.queue.current().cloned(),
            finished: session.queue.is_finished(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub progress: ProgressRecord,
    pub next: Option<WordSnapshot>,
    pub finished: bool,
}

pub struct StudyService<S> {
    store: Arc<S>,
    scheduler: ReviewScheduler<S>,
    session: Option<StudySession>,
}

impl<S: VocabularyStore> StudyService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_scheduler(store.clone(), ReviewScheduler::new(store))
    }

    pub fn with_scheduler(store: Arc<S>, scheduler: ReviewScheduler<S>) -> Self {
        Self {
            store,
            scheduler,
            session: None,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Build a new queue and make it the active session, replacing any other.
    pub async fn start_session<R: Rng + ?Sized>(
        &mut self,
        kind: SessionKind,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<SessionView> {
        let words = match kind {
            SessionKind::Daily => self.daily_words(now, rng).await?,
            SessionKind::Review => self.due_words(now).await?,
            SessionKind::Bookmarks => self.bookmarked_words().await?,
            SessionKind::Single { word_id } => {
                let word = self
                    .store
                    .get_word(WordKey::Id(word_id))
                    .await?
                    .ok_or(VocabError::WordNotFound(word_id))?;
                vec![word]
            }
        };

        let snapshots = self.snapshots(&words).await?;
        let session = StudySession {
            id: Uuid::new_v4(),
            kind,
            started_at: now,
            queue: SessionQueue::new(snapshots),
        };
        tracing::info!(
            session = %session.id,
            kind = ?kind,
            words = session.queue.len(),
            "session started"
        );

        let view = SessionView::of(&session);
        self.session = Some(session);
        Ok(view)
    }

    pub fn current(&self) -> Option<WordSnapshot> {
        self.session
            .as_ref()
            .and_then(|s| s.queue.current().cloned())
    }

    pub fn session(&self) -> Option<SessionView> {
        self.session.as_ref().map(SessionView::of)
    }

    pub fn end_session(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Record an answer for the current word and move to the next one.
    ///
    /// A finished session has no current word and rejects answers with
    /// `NoActiveSession`.
    pub async fn answer(
        &mut self,
        word_id: WordId,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome> {
        let session = self.session.as_mut().ok_or(VocabError::NoActiveSession)?;
        let expected = session
            .queue
            .current()
            .map(|w| w.word_id)
            .ok_or(VocabError::NoActiveSession)?;
        if expected != word_id {
            return Err(VocabError::OutOfTurn {
                expected,
                got: word_id,
            });
        }

        let outcome = Outcome::from_correct(correct);
        let progress = self.scheduler.record_outcome(word_id, outcome, now).await?;

        if let Some(current) = session.queue.current_mut() {
            current.mastery_level = progress.mastery_level;
        }
        if !correct {
            session.queue.set_bookmarked(word_id, true);
        }
        let next = session.queue.advance().cloned();

        Ok(AnswerOutcome {
            progress,
            finished: next.is_none(),
            next,
        })
    }

    /// Flip a word's bookmark. Returns whether it is bookmarked afterwards.
    pub async fn toggle_bookmark(&mut self, word_id: WordId, now: DateTime<Utc>) -> Result<bool> {
        self.require_word(word_id).await?;
        let bookmarked = self
            .store
            .list_bookmarks()
            .await?
            .iter()
            .any(|b| b.word_id == word_id);

        if bookmarked {
            self.store.remove_bookmark(word_id).await?;
        } else {
            self.store.add_bookmark(word_id, now).await?;
        }
        self.mark_in_session(word_id, !bookmarked);
        Ok(!bookmarked)
    }

    pub async fn bookmark(&mut self, word_id: WordId, now: DateTime<Utc>) -> Result<()> {
        self.require_word(word_id).await?;
        self.store.add_bookmark(word_id, now).await?;
        self.mark_in_session(word_id, true);
        Ok(())
    }

    /// Returns whether a bookmark was removed.
    pub async fn unbookmark(&mut self, word_id: WordId) -> Result<bool> {
        let removed = self.store.remove_bookmark(word_id).await?;
        self.mark_in_session(word_id, false);
        Ok(removed)
    }

    /// Remove every bookmark, returning how many there were.
    pub async fn clear_bookmarks(&mut self) -> Result<usize> {
        let bookmarks = self.store.list_bookmarks().await?;
        for bookmark in &bookmarks {
            self.store.remove_bookmark(bookmark.word_id).await?;
            self.mark_in_session(bookmark.word_id, false);
        }
        Ok(bookmarks.len())
    }

    pub async fn plan(&self) -> Result<DailyPlan> {
        self.store.get_daily_plan().await
    }

    /// Save the plan with zero goals replaced by defaults, returning what was stored.
    pub async fn save_plan(&self, plan: &DailyPlan) -> Result<DailyPlan> {
        let plan = plan.sanitized();
        self.store.save_plan(&plan).await?;
        Ok(plan)
    }

    pub async fn daily_summary(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<DailySummary> {
        let events = self.store.todays_events(today).await?;
        let plan = self.store.get_daily_plan().await?.sanitized();
        let words = self.store.list_words(&WordFilter::default()).await?;
        let bookmarked = self.store.list_bookmarks().await?.len();
        let due_now = self.scheduler.due_words(now).await?.len();
        Ok(DailySummary::new(
            today,
            &events,
            &plan,
            &words,
            bookmarked,
            due_now,
        ))
    }

    async fn daily_words<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Vec<Word>> {
        let plan = self.store.get_daily_plan().await?.sanitized();
        let all = self.store.list_words(&WordFilter::default()).await?;
        let seen: HashSet<WordId> = self
            .store
            .list_progress()
            .await?
            .into_iter()
            .map(|p| p.word_id)
            .collect();
        let due = self.due_words(now).await?;

        let mut vocabulary: Vec<Word> = all.into_iter().filter(|w| !seen.contains(&w.id)).collect();
        vocabulary.extend(due.iter().cloned());

        Ok(compose_today(&plan, &due, &vocabulary, rng))
    }

    async fn due_words(&self, now: DateTime<Utc>) -> Result<Vec<Word>> {
        let ids = self.scheduler.due_words(now).await?;
        let mut words = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(word) = self.store.get_word(WordKey::Id(id)).await? {
                words.push(word);
            }
        }
        Ok(words)
    }

    async fn bookmarked_words(&self) -> Result<Vec<Word>> {
        let mut words = Vec::new();
        for bookmark in self.store.list_bookmarks().await? {
            if let Some(word) = self.store.get_word(WordKey::Id(bookmark.word_id)).await? {
                words.push(word);
            }
        }
        Ok(words)
    }

    async fn snapshots(&self, words: &[Word]) -> Result<Vec<WordSnapshot>> {
        let progress: HashMap<WordId, ProgressRecord> = self
            .store
            .list_progress()
            .await?
            .into_iter()
            .map(|p| (p.word_id, p))
            .collect();
        let bookmarked: HashSet<WordId> = self
            .store
            .list_bookmarks()
            .await?
            .into_iter()
            .map(|b| b.word_id)
            .collect();

        Ok(words
            .iter()
            .map(|w| WordSnapshot::new(w, progress.get(&w.id), bookmarked.contains(&w.id)))
            .collect())
    }

    async fn require_word(&self, word_id: WordId) -> Result<Word> {
        self.store
            .get_word(WordKey::Id(word_id))
            .await?
            .ok_or(VocabError::WordNotFound(word_id))
    }

    fn mark_in_session(&mut self, word_id: WordId, bookmarked: bool) {
        if let Some(session) = self.session.as_mut() {
            session.queue.set_bookmarked(word_id, bookmarked);
        }
    }
}
