//! Error types for vocab-core.

use thiserror::Error;

use crate::types::WordId;

/// Result type alias using VocabError.
pub type Result<T> = std::result::Result<T, VocabError>;

/// Errors raised by the store, the scheduler and the study facade.
#[derive(Debug, Error)]
pub enum VocabError {
    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error("word already exists: {0}")]
    DuplicateWord(String),

    #[error("word not found: {0}")]
    WordNotFound(WordId),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("no active study session")]
    NoActiveSession,

    #[error("answered word {got} but the current word is {expected}")]
    OutOfTurn { expected: WordId, got: WordId },
}

/// Failure of a single dictionary lookup.
///
/// Never escapes the enrichment orchestrator; every variant triggers the fallback.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no dictionary entry for {0}")]
    NotFound(String),

    #[error("lookup timed out")]
    Timeout,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_duplicate_word() {
        let error = VocabError::DuplicateWord("harbor".to_string());
        assert_eq!(error.to_string(), "word already exists: harbor");
    }

    #[test]
    fn display_out_of_turn() {
        let error = VocabError::OutOfTurn { expected: 3, got: 7 };
        assert_eq!(
            error.to_string(),
            "answered word 7 but the current word is 3"
        );
    }

    #[test]
    fn display_lookup_not_found() {
        let error = LookupError::NotFound("zzyzx".to_string());
        assert_eq!(error.to_string(), "no dictionary entry for zzyzx");
    }
}
