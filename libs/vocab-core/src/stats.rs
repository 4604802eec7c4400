//! Today's progress against the daily plan.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DailyPlan, ReviewEvent, Word, WordId};

/// How many of today's answers the recent activity list shows.
pub const RECENT_ANSWERS: usize = 5;

/// One answer in the recent activity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentAnswer {
    pub word: String,
    pub correct: bool,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Answers recorded today, repeats included.
    pub reviewed: usize,
    pub correct: usize,
    pub daily_goal: u32,
    /// `reviewed` as a share of the daily goal, capped at 100.
    pub completion_percent: u8,
    pub total_words: usize,
    pub bookmarked: usize,
    pub due_now: usize,
    /// Latest answers of the day, newest first.
    pub recent: Vec<RecentAnswer>,
}

impl DailySummary {
    pub fn new(
        date: NaiveDate,
        events: &[ReviewEvent],
        plan: &DailyPlan,
        words: &[Word],
        bookmarked: usize,
        due_now: usize,
    ) -> Self {
        let reviewed = events.len();
        let correct = events.iter().filter(|e| e.outcome.is_correct()).count();
        Self {
            date,
            reviewed,
            correct,
            daily_goal: plan.daily_goal,
            completion_percent: completion_percent(reviewed, plan.daily_goal),
            total_words: words.len(),
            bookmarked,
            due_now,
            recent: recent_answers(events, words),
        }
    }
}

/// The newest answers among `events` (oldest first), skipping unknown words.
pub fn recent_answers(events: &[ReviewEvent], words: &[Word]) -> Vec<RecentAnswer> {
    let texts: HashMap<WordId, &str> = words.iter().map(|w| (w.id, w.text.as_str())).collect();
    events
        .iter()
        .rev()
        .filter_map(|event| {
            texts.get(&event.word_id).map(|text| RecentAnswer {
                word: text.to_string(),
                correct: event.outcome.is_correct(),
                answered_at: event.timestamp,
            })
        })
        .take(RECENT_ANSWERS)
        .collect()
}

fn completion_percent(reviewed: usize, goal: u32) -> u8 {
    if goal == 0 {
        return 100;
    }
    let percent = (reviewed as u64 * 100) / u64::from(goal);
    percent.min(100) as u8
}
