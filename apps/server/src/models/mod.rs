//! Database rows and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vocab_core::analyzer::{AnalyzeOptions, TierBands};
use vocab_core::report::{BatchReport, BatchSummary};
use vocab_core::types::{
    Bookmark, DailyPlan, Outcome, ProgressRecord, ReviewEvent, StudyTimeWindow, Word, WordId,
    WordSource,
};
use vocab_core::{CorpusAnalysisResult, SessionKind, VocabError};

// === Database Entity Types ===

/// Word row in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct WordRow {
    pub id: i64,
    pub text: String,
    pub phonetic: String,
    pub meaning: String,
    pub example: String,
    pub difficulty_tier: i64,
    pub frequency: i64,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl WordRow {
    pub fn into_word(self) -> Result<Word, VocabError> {
        let source = WordSource::from_str(&self.source)
            .ok_or_else(|| VocabError::Storage(format!("unknown word source {:?}", self.source)))?;
        Ok(Word {
            id: self.id,
            text: self.text,
            phonetic: self.phonetic,
            meaning: self.meaning,
            example: self.example,
            difficulty_tier: self.difficulty_tier.clamp(1, 5) as u8,
            frequency: self.frequency.clamp(1, i64::from(u32::MAX)) as u32,
            source,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProgressRow {
    pub word_id: i64,
    pub mastery_level: i64,
    pub next_review_date: DateTime<Utc>,
    pub last_review_date: DateTime<Utc>,
    pub total_reviews: i64,
}

impl ProgressRow {
    pub fn into_record(self) -> ProgressRecord {
        ProgressRecord {
            word_id: self.word_id,
            mastery_level: self.mastery_level.clamp(0, 5) as u8,
            next_review_date: self.next_review_date,
            last_review_date: self.last_review_date,
            total_reviews: self.total_reviews.max(0) as u32,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ReviewEventRow {
    pub word_id: i64,
    pub reviewed_at: DateTime<Utc>,
    pub outcome: String,
}

impl ReviewEventRow {
    pub fn into_event(self) -> ReviewEvent {
        ReviewEvent {
            word_id: self.word_id,
            timestamp: self.reviewed_at,
            outcome: Outcome::from_correct(self.outcome == "correct"),
        }
    }
}

pub fn outcome_str(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Correct => "correct",
        Outcome::Incorrect => "incorrect",
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PlanRow {
    pub daily_goal: i64,
    pub review_goal: i64,
    pub study_time: String,
    pub notifications_enabled: bool,
}

impl PlanRow {
    pub fn into_plan(self) -> DailyPlan {
        DailyPlan::from_raw(
            Some(self.daily_goal),
            Some(self.review_goal),
            StudyTimeWindow::from_str_lossy(&self.study_time),
            self.notifications_enabled,
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BookmarkRow {
    pub word_id: i64,
    pub added_at: DateTime<Utc>,
}

impl From<BookmarkRow> for Bookmark {
    fn from(row: BookmarkRow) -> Self {
        Bookmark {
            word_id: row.word_id,
            added_at: row.added_at,
        }
    }
}

/// Record of one imported text
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CorpusImport {
    pub id: i64,
    pub title: String,
    pub content_hash: String,
    pub total_tokens: i64,
    pub unique_tokens: i64,
    pub candidates: i64,
    pub saved: i64,
    pub skipped: i64,
    pub failed: i64,
    pub imported_at: DateTime<Utc>,
}

/// Insert payload for a corpus import record
#[derive(Debug, Clone)]
pub struct NewCorpusImport {
    pub title: String,
    pub content_hash: String,
    pub total_tokens: usize,
    pub unique_tokens: usize,
    pub candidates: usize,
    pub summary: BatchSummary,
}

// === API Request/Response Types ===

/// Analysis knobs shared by the analyze and import endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeParams {
    pub exclude_common: Option<bool>,
    pub min_frequency: Option<u32>,
    pub tier_bands: Option<Vec<u32>>,
}

impl AnalyzeParams {
    /// Resolve to options, falling back to defaults for anything unset or invalid.
    pub fn to_options(&self) -> AnalyzeOptions {
        let defaults = AnalyzeOptions::default();
        AnalyzeOptions {
            exclude_common: self.exclude_common.unwrap_or(defaults.exclude_common),
            min_frequency: self.min_frequency.unwrap_or(defaults.min_frequency),
            tier_bands: self
                .tier_bands
                .clone()
                .map(TierBands::or_default)
                .unwrap_or(defaults.tier_bands),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(flatten)]
    pub params: AnalyzeParams,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub title: Option<String>,
    pub text: String,
    /// Look words up in the dictionary before saving.
    #[serde(default = "default_true")]
    pub enrich: bool,
    #[serde(flatten)]
    pub params: AnalyzeParams,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub import: CorpusImport,
    pub analysis: CorpusAnalysisResult,
    /// Lookup outcomes, present when the import was enriched.
    pub enrichment: Option<BatchSummary>,
    pub summary: BatchSummary,
    pub report: BatchReport,
}

#[derive(Debug, Default, Deserialize)]
pub struct WordListQuery {
    pub tier: Option<u8>,
    pub source: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWordRequest {
    pub word: String,
    #[serde(default)]
    pub phonetic: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub example: String,
    pub difficulty_tier: Option<u8>,
}

/// Word list entry with its mastery, 0 for words never reviewed
#[derive(Debug, Serialize)]
pub struct WordListItem {
    #[serde(flatten)]
    pub word: Word,
    pub mastery_level: u8,
}

#[derive(Debug, Serialize)]
pub struct WordDetailResponse {
    pub word: Word,
    pub progress: Option<ProgressRecord>,
    pub bookmarked: bool,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    #[serde(flatten)]
    pub kind: SessionKind,
    /// Fixed seed for reproducible new-word sampling.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub word_id: WordId,
    pub correct: bool,
}

/// Plan update. Goals accept numbers or numeric strings; anything else means default.
#[derive(Debug, Default, Deserialize)]
pub struct PlanRequest {
    pub daily_goal: Option<serde_json::Value>,
    pub review_goal: Option<serde_json::Value>,
    pub study_time: Option<String>,
    pub notifications_enabled: Option<bool>,
}

impl PlanRequest {
    pub fn to_plan(&self) -> DailyPlan {
        DailyPlan::from_raw(
            self.daily_goal.as_ref().and_then(goal_value),
            self.review_goal.as_ref().and_then(goal_value),
            self.study_time
                .as_deref()
                .map(StudyTimeWindow::from_str_lossy)
                .unwrap_or_default(),
            self.notifications_enabled.unwrap_or(false),
        )
    }
}

fn goal_value(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct BookmarkedWord {
    pub word: Word,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BookmarkStateResponse {
    pub word_id: WordId,
    pub bookmarked: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearBookmarksResponse {
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn plan_request_tolerates_bad_goals() {
        let request: PlanRequest =
            serde_json::from_value(json!({"daily_goal": "abc", "review_goal": "30"})).unwrap();
        let plan = request.to_plan();
        assert_eq!(plan.daily_goal, 20);
        assert_eq!(plan.review_goal, 30);
        assert_eq!(plan.study_time, StudyTimeWindow::Any);
    }

    #[test]
    fn plan_request_reads_numbers() {
        let request: PlanRequest = serde_json::from_value(
            json!({"daily_goal": 35, "study_time": "evening", "notifications_enabled": true}),
        )
        .unwrap();
        let plan = request.to_plan();
        assert_eq!(plan.daily_goal, 35);
        assert_eq!(plan.review_goal, 50);
        assert_eq!(plan.study_time, StudyTimeWindow::Evening);
        assert!(plan.notifications_enabled);
    }

    #[test]
    fn invalid_tier_bands_fall_back() {
        let params = AnalyzeParams {
            tier_bands: Some(vec![5, 10, 0]),
            ..Default::default()
        };
        assert_eq!(params.to_options().tier_bands, TierBands::default());
    }

    #[test]
    fn start_request_reads_kind_and_seed() {
        let request: StartSessionRequest =
            serde_json::from_value(json!({"kind": "single", "word_id": 9, "seed": 3})).unwrap();
        assert_eq!(request.kind, SessionKind::Single { word_id: 9 });
        assert_eq!(request.seed, Some(3));
    }
}
