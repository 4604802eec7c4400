//! Daily session composition and the forward-only session cursor.

use std::collections::HashSet;

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{DailyPlan, Word, WordId, WordSnapshot};

/// Blend due reviews with new-word intake under the plan's quotas.
///
/// The queue holds up to `review_goal` due words in their given order,
/// followed by a random sample of words from `vocabulary` that are not due,
/// filling the remainder of `daily_goal`. The plan is used as given; callers
/// sanitize it once beforehand.
pub fn compose_today<R: Rng + ?Sized>(
    plan: &DailyPlan,
    due: &[Word],
    vocabulary: &[Word],
    rng: &mut R,
) -> Vec<Word> {
    if vocabulary.is_empty() {
        return Vec::new();
    }

    let review_to_take = due.len().min(plan.review_goal as usize);
    let new_slots = (plan.daily_goal as usize).saturating_sub(review_to_take);

    let due_ids: HashSet<WordId> = due.iter().map(|w| w.id).collect();
    let pool: Vec<&Word> = vocabulary
        .iter()
        .filter(|w| !due_ids.contains(&w.id))
        .collect();
    let take = new_slots.min(pool.len());

    let mut queue: Vec<Word> = due[..review_to_take].to_vec();
    queue.extend(
        index::sample(rng, pool.len(), take)
            .into_iter()
            .map(|idx| pool[idx].clone()),
    );

    tracing::debug!(
        reviews = review_to_take,
        new = take,
        pool = pool.len(),
        "composed session"
    );
    queue
}

/// Ordered words for one session, consumed by a cursor that only moves forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionQueue {
    words: Vec<WordSnapshot>,
    cursor: usize,
}

impl SessionQueue {
    pub fn new(words: Vec<WordSnapshot>) -> Self {
        Self { words, cursor: 0 }
    }

    /// Word under the cursor, or None once the queue is exhausted.
    pub fn current(&self) -> Option<&WordSnapshot> {
        self.words.get(self.cursor)
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut WordSnapshot> {
        self.words.get_mut(self.cursor)
    }

    pub(crate) fn set_bookmarked(&mut self, word_id: WordId, bookmarked: bool) {
        for word in self.words.iter_mut().filter(|w| w.word_id == word_id) {
            word.bookmarked = bookmarked;
        }
    }

    /// Move past the current word, returning the next one.
    pub fn advance(&mut self) -> Option<&WordSnapshot> {
        if self.cursor < self.words.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Zero-based position of the cursor.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.words.len() - self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.words.len()
    }

    pub fn words(&self) -> &[WordSnapshot] {
        &self.words
    }
}
