//! Dictionary enrichment of candidate words.
//!
//! Words are looked up one at a time with a fixed pause between lookups. A
//! failed lookup never aborts the batch: the word gets a deterministic local
//! fallback instead, so the output always has one entry per input, in order.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::report::{BatchReport, ItemStatus};
use crate::types::CandidateWord;

/// Most example sentences kept per word.
pub const MAX_EXAMPLES: usize = 3;

/// Dictionary data for one word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub phonetic: String,
    /// First definition, prefixed with its part of speech ("n. ...").
    pub meaning: String,
    pub examples: Vec<String>,
}

/// Pluggable dictionary lookup.
pub trait DictionaryLookup: Send + Sync {
    fn lookup(&self, word: &str)
        -> impl Future<Output = Result<LookupEntry, LookupError>> + Send;
}

/// In-memory dictionary, used for offline imports and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    entries: HashMap<String, LookupEntry>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, word: &str, entry: LookupEntry) -> Self {
        self.insert(word, entry);
        self
    }

    pub fn insert(&mut self, word: &str, entry: LookupEntry) {
        self.entries.insert(word.to_lowercase(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DictionaryLookup for StaticLookup {
    async fn lookup(&self, word: &str) -> Result<LookupEntry, LookupError> {
        self.entries
            .get(&word.to_lowercase())
            .cloned()
            .ok_or_else(|| LookupError::NotFound(word.to_string()))
    }
}

/// Pseudo-phonetic with every vowel replaced by a schwa.
pub fn fallback_phonetic(word: &str) -> String {
    let body: String = word
        .to_lowercase()
        .chars()
        .map(|c| if "aeiou".contains(c) { 'ə' } else { c })
        .collect();
    format!("/{}/", body)
}

pub fn fallback_meaning(word: &str) -> String {
    format!("{}: definition unavailable (dictionary lookup failed)", word)
}

pub fn fallback_example(word: &str) -> String {
    format!("This is an example sentence for {}.", word)
}

/// Deterministic stand-in for a failed lookup.
pub fn fallback_entry(word: &str) -> LookupEntry {
    LookupEntry {
        phonetic: fallback_phonetic(word),
        meaning: fallback_meaning(word),
        examples: vec![fallback_example(word)],
    }
}

/// A candidate word with its dictionary annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedWord {
    pub text: String,
    pub frequency: u32,
    pub tier: u8,
    pub phonetic: String,
    pub meaning: String,
    pub example: String,
    pub examples: Vec<String>,
    pub status: ItemStatus,
}

impl EnrichedWord {
    /// Candidate with empty annotations, for imports without lookups.
    pub fn unenriched(candidate: &CandidateWord) -> Self {
        Self::from_entry(candidate, LookupEntry::default(), ItemStatus::Skipped)
    }

    fn from_entry(candidate: &CandidateWord, entry: LookupEntry, status: ItemStatus) -> Self {
        Self {
            text: candidate.text.clone(),
            frequency: candidate.frequency,
            tier: candidate.tier,
            phonetic: entry.phonetic,
            meaning: entry.meaning,
            example: entry.examples.first().cloned().unwrap_or_default(),
            examples: entry.examples,
            status,
        }
    }
}

/// Result of one enrichment batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentBatch {
    pub words: Vec<EnrichedWord>,
    pub report: BatchReport,
}

/// Annotates candidate words through a lookup strategy.
pub struct EnrichmentOrchestrator<L> {
    lookup: L,
    delay: Duration,
}

impl<L: DictionaryLookup> EnrichmentOrchestrator<L> {
    pub fn new(lookup: L, delay: Duration) -> Self {
        Self { lookup, delay }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Enrich every word in order.
    ///
    /// `on_progress(current, total, word)` runs after each item whatever its
    /// outcome. Repeated words within the batch are looked up once.
    pub async fn enrich_batch<F>(
        &self,
        words: &[CandidateWord],
        mut on_progress: F,
    ) -> EnrichmentBatch
    where
        F: FnMut(usize, usize, &str),
    {
        let total = words.len();
        let mut cache: HashMap<String, (LookupEntry, ItemStatus)> = HashMap::new();
        let mut enriched = Vec::with_capacity(total);
        let mut report = BatchReport::default();
        let mut lookups_done = 0usize;

        for (idx, candidate) in words.iter().enumerate() {
            let (entry, status) = match cache.get(&candidate.text) {
                Some(cached) => cached.clone(),
                None => {
                    if lookups_done > 0 && !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    lookups_done += 1;
                    let resolved = self.resolve(&candidate.text).await;
                    cache.insert(candidate.text.clone(), resolved.clone());
                    resolved
                }
            };

            let detail = match status {
                ItemStatus::Fallback => Some("dictionary lookup failed".to_string()),
                _ => None,
            };
            report.push(&candidate.text, status, detail);
            enriched.push(EnrichedWord::from_entry(candidate, entry, status));
            on_progress(idx + 1, total, &candidate.text);
        }

        tracing::info!(
            total,
            lookups = lookups_done,
            fallbacks = report.count(ItemStatus::Fallback),
            "enrichment batch finished"
        );

        EnrichmentBatch {
            words: enriched,
            report,
        }
    }

    async fn resolve(&self, word: &str) -> (LookupEntry, ItemStatus) {
        match self.lookup.lookup(word).await {
            Ok(entry) => (complete_entry(word, entry), ItemStatus::Success),
            Err(e) => {
                tracing::warn!("lookup for {:?} failed: {}", word, e);
                (fallback_entry(word), ItemStatus::Fallback)
            }
        }
    }
}

/// Fill blanks in a successful lookup and cap the example list.
fn complete_entry(word: &str, mut entry: LookupEntry) -> LookupEntry {
    if entry.phonetic.trim().is_empty() {
        entry.phonetic = fallback_phonetic(word);
    }
    if entry.meaning.trim().is_empty() {
        entry.meaning = fallback_meaning(word);
    }
    entry.examples.retain(|e| !e.trim().is_empty());
    entry.examples.truncate(MAX_EXAMPLES);
    if entry.examples.is_empty() {
        entry.examples.push(fallback_example(word));
    }
    entry
}
