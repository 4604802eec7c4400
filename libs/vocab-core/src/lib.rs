//! Core vocabulary-learning library shared by the server and any other front end.
//!
//! Provides:
//! - Text ingestion and frequency tiering of candidate words
//! - Mastery-level review scheduling
//! - Daily session composition
//! - Dictionary enrichment with local fallback, and bulk import
//! - The storage seam and the study facade

pub mod analyzer;
pub mod composer;
pub mod enrichment;
pub mod error;
pub mod import;
pub mod ingest;
pub mod report;
pub mod scheduler;
pub mod service;
pub mod stats;
pub mod store;
pub mod types;

pub use analyzer::{AnalyzeOptions, FrequencyAnalyzer, FrequencyTable, TierBands};
pub use composer::{compose_today, SessionQueue};
pub use enrichment::{
    fallback_entry, DictionaryLookup, EnrichedWord, EnrichmentBatch, EnrichmentOrchestrator,
    LookupEntry, StaticLookup,
};
pub use error::{LookupError, Result, VocabError};
pub use import::{import_candidates, import_words};
pub use ingest::tokenize;
pub use report::{BatchReport, BatchSummary, ItemResult, ItemStatus};
pub use scheduler::{IntervalTable, MasterySchedule, ReviewScheduler};
pub use service::{AnswerOutcome, SessionKind, SessionView, StudyService, StudySession};
pub use stats::{DailySummary, RecentAnswer};
pub use store::{MemoryStore, VocabularyStore};
pub use types::{
    normalize_word, Bookmark, CandidateWord, CorpusAnalysisResult, DailyPlan, NewWord, Outcome,
    ProgressRecord, ReviewEvent, StudyTimeWindow, Word, WordFilter, WordId, WordKey, WordSnapshot,
    WordSource,
};
