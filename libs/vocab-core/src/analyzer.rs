//! Frequency analysis and difficulty tiering of a token stream.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VocabError};
use crate::ingest::tokenize;
use crate::types::{CandidateWord, CorpusAnalysisResult};

/// Shortest candidate word, in characters.
pub const MIN_WORD_LEN: usize = 3;

/// Longest candidate word, in characters.
pub const MAX_WORD_LEN: usize = 20;

/// Closed-class words excluded from candidacy when `exclude_common` is set.
pub const STOPLIST: &[&str] = &[
    // articles and determiners
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "either", "neither",
    "some", "any", "no", "all", "both", "such", "much", "many", "few", "more", "most", "less",
    "least", "other", "another",
    // pronouns
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my", "your",
    "his", "its", "our", "their", "mine", "yours", "hers", "ours", "theirs", "myself",
    "yourself", "himself", "herself", "itself", "ourselves", "themselves", "who", "whom",
    "whose", "which", "what",
    // prepositions
    "in", "on", "at", "to", "for", "of", "with", "by", "from", "up", "down", "out", "off",
    "over", "under", "into", "onto", "upon", "about", "above", "below", "after", "before",
    "between", "through", "during", "without", "within", "against", "among", "around",
    // conjunctions
    "and", "or", "but", "nor", "so", "yet", "if", "then", "than", "because", "while",
    "although", "though", "unless", "until", "when", "where", "why", "how", "whether",
    // auxiliary and modal verbs
    "is", "am", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "done", "will", "would", "shall", "should", "can", "could", "may",
    "might", "must",
    // contractions
    "i'm", "you're", "he's", "she's", "it's", "we're", "they're", "i've", "you've", "we've",
    "they've", "i'd", "you'd", "he'd", "she'd", "we'd", "they'd", "i'll", "you'll", "he'll",
    "she'll", "we'll", "they'll", "isn't", "aren't", "wasn't", "weren't", "don't", "doesn't",
    "didn't", "won't", "wouldn't", "can't", "couldn't", "shouldn't", "haven't", "hasn't",
    "hadn't",
    // particles and adverbs of degree
    "not", "yes", "as", "also", "too", "very", "just", "only", "even", "here", "there",
    "now", "again",
];

/// Descending frequency lower bounds, one per tier, ending in zero.
///
/// Tier `n` covers frequencies in `[bounds[n-1], bounds[n-2])`; tier 1 is unbounded above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct TierBands {
    lower_bounds: Vec<u32>,
}

impl TryFrom<Vec<u32>> for TierBands {
    type Error = VocabError;

    fn try_from(lower_bounds: Vec<u32>) -> Result<Self> {
        Self::new(lower_bounds)
    }
}

impl From<TierBands> for Vec<u32> {
    fn from(bands: TierBands) -> Self {
        bands.lower_bounds
    }
}

impl Default for TierBands {
    fn default() -> Self {
        Self {
            lower_bounds: vec![1000, 500, 200, 50, 0],
        }
    }
}

impl TierBands {
    /// Validate and build tier bands.
    pub fn new(lower_bounds: Vec<u32>) -> Result<Self> {
        if lower_bounds.is_empty() || lower_bounds.len() > 5 {
            return Err(VocabError::Validation(format!(
                "expected 1 to 5 tier bands, got {}",
                lower_bounds.len()
            )));
        }
        if lower_bounds.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(VocabError::Validation(format!(
                "tier bands must be strictly descending: {:?}",
                lower_bounds
            )));
        }
        if lower_bounds.last() != Some(&0) {
            return Err(VocabError::Validation(format!(
                "lowest tier band must start at 0: {:?}",
                lower_bounds
            )));
        }
        Ok(Self { lower_bounds })
    }

    /// Build tier bands, falling back to the defaults on invalid input.
    pub fn or_default(lower_bounds: Vec<u32>) -> Self {
        Self::new(lower_bounds).unwrap_or_else(|e| {
            tracing::warn!("{}, using default tier bands", e);
            Self::default()
        })
    }

    /// Tier for a frequency; the first band whose lower bound is met wins.
    pub fn tier_for(&self, frequency: u32) -> u8 {
        self.lower_bounds
            .iter()
            .position(|&lower| frequency >= lower)
            .map(|idx| idx as u8 + 1)
            .unwrap_or(self.tier_count())
    }

    pub fn tier_count(&self) -> u8 {
        self.lower_bounds.len() as u8
    }

    pub fn lower_bounds(&self) -> &[u32] {
        &self.lower_bounds
    }
}

/// Options controlling candidate selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    pub exclude_common: bool,
    pub min_frequency: u32,
    pub tier_bands: TierBands,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            exclude_common: true,
            min_frequency: 3,
            tier_bands: TierBands::default(),
        }
    }
}

/// Token occurrence counts, keyed by lowercase token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u32>,
}

impl FrequencyTable {
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut counts = HashMap::new();
        for token in tokens {
            *counts.entry(token.as_ref().to_lowercase()).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn get(&self, token: &str) -> u32 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Turns a token stream into a tiered candidate vocabulary.
#[derive(Debug, Clone)]
pub struct FrequencyAnalyzer {
    options: AnalyzeOptions,
    stoplist: HashSet<&'static str>,
}

impl Default for FrequencyAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzeOptions::default())
    }
}

impl FrequencyAnalyzer {
    pub fn new(options: AnalyzeOptions) -> Self {
        Self {
            options,
            stoplist: STOPLIST.iter().copied().collect(),
        }
    }

    pub fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    /// Count token occurrences.
    pub fn count<S: AsRef<str>>(&self, tokens: &[S]) -> FrequencyTable {
        FrequencyTable::from_tokens(tokens)
    }

    /// Tokenize and analyze raw text.
    pub fn analyze_text(&self, text: &str) -> CorpusAnalysisResult {
        self.analyze(&tokenize(text))
    }

    /// Filter, deduplicate and tier a token stream.
    pub fn analyze<S: AsRef<str>>(&self, tokens: &[S]) -> CorpusAnalysisResult {
        let table = self.count(tokens);
        let min_frequency = self.options.min_frequency.max(1);
        let bands = &self.options.tier_bands;

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for token in tokens {
            let key = token.as_ref().to_lowercase();
            let frequency = table.get(&key);
            if frequency < min_frequency || !self.is_candidate(&key) {
                continue;
            }
            if seen.insert(key.clone()) {
                candidates.push(CandidateWord {
                    tier: bands.tier_for(frequency),
                    text: key,
                    frequency,
                });
            }
        }

        let mut tier_distribution: BTreeMap<u8, usize> =
            (1..=bands.tier_count()).map(|tier| (tier, 0)).collect();
        for candidate in &candidates {
            *tier_distribution.entry(candidate.tier).or_insert(0) += 1;
        }

        tracing::debug!(
            total = tokens.len(),
            unique = table.len(),
            candidates = candidates.len(),
            "analyzed corpus"
        );

        CorpusAnalysisResult {
            total_tokens: tokens.len(),
            unique_tokens: table.len(),
            candidate_word_list: candidates,
            tier_distribution,
        }
    }

    fn is_candidate(&self, word: &str) -> bool {
        let len = word.chars().count();
        if !(MIN_WORD_LEN..=MAX_WORD_LEN).contains(&len) {
            return false;
        }
        !(self.options.exclude_common && self.stoplist.contains(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "The cat sat on the mat. The cat ran.";

    fn analyzer(exclude_common: bool, min_frequency: u32) -> FrequencyAnalyzer {
        FrequencyAnalyzer::new(AnalyzeOptions {
            exclude_common,
            min_frequency,
            tier_bands: TierBands::default(),
        })
    }

    #[test]
    fn counts_sample_frequencies() {
        let analyzer = analyzer(false, 1);
        let table = analyzer.count(&tokenize(SAMPLE));
        assert_eq!(table.get("the"), 3);
        assert_eq!(table.get("cat"), 2);
        assert_eq!(table.get("sat"), 1);
        assert_eq!(table.get("on"), 1);
        assert_eq!(table.get("mat"), 1);
        assert_eq!(table.get("ran"), 1);
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn analyze_without_stoplist() {
        let result = analyzer(false, 1).analyze_text(SAMPLE);
        assert_eq!(result.total_tokens, 9);
        assert_eq!(result.unique_tokens, 6);
        // "on" is shorter than the minimum candidate length
        assert_eq!(result.candidate_texts(), vec!["the", "cat", "sat", "mat", "ran"]);
    }

    #[test]
    fn analyze_with_stoplist() {
        let result = analyzer(true, 1).analyze_text(SAMPLE);
        assert_eq!(result.candidate_texts(), vec!["cat", "sat", "mat", "ran"]);
        assert_eq!(result.candidate_word_list[0].frequency, 2);
    }

    #[test]
    fn min_frequency_filters_rare_words() {
        let result = analyzer(true, 2).analyze_text(SAMPLE);
        assert_eq!(result.candidate_texts(), vec!["cat"]);
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let long = "a".repeat(20);
        let too_long = "b".repeat(21);
        let text = format!("cab {} {}", long, too_long);
        let result = analyzer(false, 1).analyze_text(&text);
        assert_eq!(result.candidate_texts(), vec!["cab", long.as_str()]);
    }

    #[test]
    fn empty_corpus_is_valid() {
        let result = analyzer(true, 1).analyze_text("");
        assert_eq!(result.total_tokens, 0);
        assert_eq!(result.unique_tokens, 0);
        assert!(result.candidate_word_list.is_empty());
        assert_eq!(result.tier_distribution.values().sum::<usize>(), 0);
        assert_eq!(result.tier_distribution.len(), 5);
    }

    #[test]
    fn distribution_counts_candidates_per_tier() {
        let mut tokens = vec!["harbor"; 600];
        tokens.extend(vec!["lantern"; 60]);
        tokens.extend(vec!["quay"; 4]);
        let result = analyzer(true, 1).analyze(&tokens);
        assert_eq!(result.tier_distribution[&2], 1);
        assert_eq!(result.tier_distribution[&4], 1);
        assert_eq!(result.tier_distribution[&5], 1);
        assert_eq!(result.candidate_word_list[0].tier, 2);
    }

    #[test]
    fn every_frequency_maps_to_exactly_one_tier() {
        let bands = TierBands::default();
        for frequency in [0, 1, 49, 50, 199, 200, 499, 500, 999, 1000, u32::MAX] {
            let matching: Vec<u8> = (1..=bands.tier_count())
                .filter(|&tier| {
                    let idx = tier as usize - 1;
                    let lower = bands.lower_bounds()[idx];
                    let upper = idx
                        .checked_sub(1)
                        .map(|prev| bands.lower_bounds()[prev]);
                    frequency >= lower && upper.map_or(true, |u| frequency < u)
                })
                .collect();
            assert_eq!(matching, vec![bands.tier_for(frequency)], "frequency {}", frequency);
        }
    }

    #[test]
    fn boundary_resolves_to_easier_tier() {
        let bands = TierBands::default();
        assert_eq!(bands.tier_for(1000), 1);
        assert_eq!(bands.tier_for(999), 2);
        assert_eq!(bands.tier_for(50), 4);
        assert_eq!(bands.tier_for(0), 5);
    }

    #[test]
    fn rejects_invalid_bands() {
        assert!(TierBands::new(vec![]).is_err());
        assert!(TierBands::new(vec![10, 10, 0]).is_err());
        assert!(TierBands::new(vec![10, 20, 0]).is_err());
        assert!(TierBands::new(vec![100, 10]).is_err());
        assert!(TierBands::new(vec![6, 5, 4, 3, 2, 0]).is_err());
        assert!(TierBands::new(vec![100, 10, 0]).is_ok());
    }

    #[test]
    fn bands_deserialize_through_validation() {
        let bands: TierBands = serde_json::from_str("[100, 10, 0]").unwrap();
        assert_eq!(bands.tier_for(50), 2);
        assert_eq!(serde_json::to_string(&bands).unwrap(), "[100,10,0]");

        assert!(serde_json::from_str::<TierBands>("[]").is_err());
        assert!(serde_json::from_str::<TierBands>("[10, 20, 0]").is_err());
    }

    #[test]
    fn invalid_bands_fall_back_to_default() {
        assert_eq!(TierBands::or_default(vec![1, 2, 3]), TierBands::default());
    }
}
