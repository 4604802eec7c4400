//! Test fixtures and request builders.

use serde_json::json;

use vocab_core::enrichment::{LookupEntry, StaticLookup};

/// Short text where the closed-class filter matters.
pub const CAT_TEXT: &str = "The cat sat on the mat. The cat ran.";

/// Text with five candidate words, each appearing three times.
pub fn harbor_text() -> String {
    "The harbor lantern glowed. The quay was quiet.\n".repeat(3)
}

/// Candidate words of `harbor_text`, in order of first appearance.
pub const HARBOR_WORDS: [&str; 5] = ["harbor", "lantern", "glowed", "quay", "quiet"];

fn entry(phonetic: &str, meaning: &str, example: &str) -> LookupEntry {
    LookupEntry {
        phonetic: phonetic.to_string(),
        meaning: meaning.to_string(),
        examples: vec![example.to_string()],
    }
}

/// Dictionary knowing three of the five harbor words.
pub fn static_dictionary() -> StaticLookup {
    StaticLookup::new()
        .with_entry(
            "harbor",
            entry("/ˈhɑːrbər/", "noun. A sheltered port.", "Ships rested in the harbor."),
        )
        .with_entry(
            "lantern",
            entry("/ˈlæntərn/", "noun. A portable lamp.", "She lit the lantern."),
        )
        .with_entry(
            "quay",
            entry("/kiː/", "noun. A landing place.", "The boat drew up to the quay."),
        )
}

/// Create an import request body.
pub fn import_request(title: Option<&str>, text: &str, enrich: bool) -> serde_json::Value {
    json!({ "title": title, "text": text, "enrich": enrich })
}

/// Create a manual word request body.
pub fn create_word_request(word: &str, meaning: &str) -> serde_json::Value {
    json!({ "word": word, "meaning": meaning })
}

/// Create a start session request body.
pub fn start_request(kind: &str, seed: u64) -> serde_json::Value {
    json!({ "kind": kind, "seed": seed })
}

/// Create a single-word session request body.
pub fn start_single_request(word_id: i64) -> serde_json::Value {
    json!({ "kind": "single", "word_id": word_id })
}

/// Create an answer request body.
pub fn answer_request(word_id: i64, correct: bool) -> serde_json::Value {
    json!({ "word_id": word_id, "correct": correct })
}
