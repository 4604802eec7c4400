//! Core types for the vocabulary builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Store-assigned word identifier.
pub type WordId = i64;

/// Highest mastery level a word can reach.
pub const MAX_MASTERY: u8 = 5;

/// Default number of words per daily session.
pub const DEFAULT_DAILY_GOAL: u32 = 20;

/// Default cap on reviews per daily session.
pub const DEFAULT_REVIEW_GOAL: u32 = 50;

/// Where a word entered the vocabulary from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordSource {
    Manual,
    Corpus,
}

impl WordSource {
    /// Get the source name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Corpus => "corpus",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "corpus" => Some(Self::Corpus),
            _ => None,
        }
    }
}

/// A stored vocabulary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub text: String,
    pub phonetic: String,
    pub meaning: String,
    pub example: String,
    pub difficulty_tier: u8,
    pub frequency: u32,
    pub source: WordSource,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a word (the store assigns id and creation time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWord {
    pub text: String,
    pub phonetic: String,
    pub meaning: String,
    pub example: String,
    pub difficulty_tier: u8,
    pub frequency: u32,
    pub source: WordSource,
}

impl NewWord {
    /// Bare manual entry with empty annotations.
    pub fn manual(text: &str) -> Self {
        Self {
            text: normalize_word(text),
            phonetic: String::new(),
            meaning: String::new(),
            example: String::new(),
            difficulty_tier: 3,
            frequency: 1,
            source: WordSource::Manual,
        }
    }
}

/// Case-normalize a word for storage and lookup.
pub fn normalize_word(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Key for single-word lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKey<'a> {
    Id(WordId),
    Text(&'a str),
}

/// Filter for listing words. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<WordSource>,
    /// Case-insensitive substring of the word text or its meaning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl WordFilter {
    /// Whether a word passes this filter.
    pub fn matches(&self, word: &Word) -> bool {
        if self.tier.is_some_and(|t| t != word.difficulty_tier) {
            return false;
        }
        if self.source.is_some_and(|s| s != word.source) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                word.text.to_lowercase().contains(&term)
                    || word.meaning.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

/// Binary result of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Per-word review state. Exists only once a word has been reviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub word_id: WordId,
    pub mastery_level: u8,
    pub next_review_date: DateTime<Utc>,
    pub last_review_date: DateTime<Utc>,
    pub total_reviews: u32,
}

impl ProgressRecord {
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review_date <= as_of
    }
}

/// Append-only review log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub word_id: WordId,
    pub timestamp: DateTime<Utc>,
    pub outcome: Outcome,
}

/// Preferred time of day for study reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyTimeWindow {
    Any,
    Morning,
    Afternoon,
    Evening,
}

impl Default for StudyTimeWindow {
    fn default() -> Self {
        Self::Any
    }
}

impl StudyTimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    /// Parse from string, treating unknown values as `Any`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "morning" => Self::Morning,
            "afternoon" => Self::Afternoon,
            "evening" => Self::Evening,
            _ => Self::Any,
        }
    }
}

/// The learner's daily quotas. Singleton, overwritten wholesale on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub daily_goal: u32,
    pub review_goal: u32,
    pub study_time: StudyTimeWindow,
    pub notifications_enabled: bool,
}

impl Default for DailyPlan {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            review_goal: DEFAULT_REVIEW_GOAL,
            study_time: StudyTimeWindow::default(),
            notifications_enabled: false,
        }
    }
}

impl DailyPlan {
    /// Build a plan from raw goal inputs, substituting defaults for missing
    /// or non-positive values.
    pub fn from_raw(
        daily_goal: Option<i64>,
        review_goal: Option<i64>,
        study_time: StudyTimeWindow,
        notifications_enabled: bool,
    ) -> Self {
        Self {
            daily_goal: goal_or_default(daily_goal, DEFAULT_DAILY_GOAL),
            review_goal: goal_or_default(review_goal, DEFAULT_REVIEW_GOAL),
            study_time,
            notifications_enabled,
        }
    }

    /// Replace zero goals with the defaults.
    pub fn sanitized(&self) -> Self {
        let mut plan = self.clone();
        if plan.daily_goal == 0 {
            tracing::warn!("daily goal is zero, using default {}", DEFAULT_DAILY_GOAL);
            plan.daily_goal = DEFAULT_DAILY_GOAL;
        }
        if plan.review_goal == 0 {
            tracing::warn!("review goal is zero, using default {}", DEFAULT_REVIEW_GOAL);
            plan.review_goal = DEFAULT_REVIEW_GOAL;
        }
        plan
    }
}

fn goal_or_default(raw: Option<i64>, default: u32) -> u32 {
    match raw {
        Some(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
        _ => default,
    }
}

/// Entry in the bookmark ("new words") set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub word_id: WordId,
    pub added_at: DateTime<Utc>,
}

/// A filtered, tiered word produced by corpus analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateWord {
    pub text: String,
    pub frequency: u32,
    pub tier: u8,
}

/// Outcome of analyzing one corpus. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusAnalysisResult {
    /// Token count before candidate filtering.
    pub total_tokens: usize,
    /// Distinct tokens after ingestion filtering.
    pub unique_tokens: usize,
    pub candidate_word_list: Vec<CandidateWord>,
    pub tier_distribution: BTreeMap<u8, usize>,
}

impl CorpusAnalysisResult {
    pub fn candidate_texts(&self) -> Vec<&str> {
        self.candidate_word_list
            .iter()
            .map(|c| c.text.as_str())
            .collect()
    }
}

/// What the presentation layer shows for one queued word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSnapshot {
    pub word_id: WordId,
    pub word: String,
    pub phonetic: String,
    pub meaning: String,
    pub example: String,
    pub difficulty_tier: u8,
    pub mastery_level: u8,
    pub bookmarked: bool,
}

impl WordSnapshot {
    pub fn new(word: &Word, progress: Option<&ProgressRecord>, bookmarked: bool) -> Self {
        Self {
            word_id: word.id,
            word: word.text.clone(),
            phonetic: word.phonetic.clone(),
            meaning: word.meaning.clone(),
            example: word.example.clone(),
            difficulty_tier: word.difficulty_tier,
            mastery_level: progress.map(|p| p.mastery_level).unwrap_or(0),
            bookmarked,
        }
    }
}
