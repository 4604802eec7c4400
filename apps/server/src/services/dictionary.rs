//! Dictionary lookup backends.
//!
//! `HttpLookup` talks to a Free Dictionary API compatible endpoint
//! (`GET {base}/{word}`). `DictionaryBackend` picks between it and an
//! in-memory dictionary according to the configured lookup mode.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use vocab_core::enrichment::{DictionaryLookup, LookupEntry, StaticLookup, MAX_EXAMPLES};
use vocab_core::LookupError;

use crate::error::{ApiError, Result};

/// One entry of the dictionary API response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEntry {
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub phonetics: Vec<ApiPhonetic>,
    #[serde(default)]
    pub meanings: Vec<ApiMeaning>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiPhonetic {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMeaning {
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<ApiDefinition>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiDefinition {
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Reduce an API response to a lookup entry.
pub fn parse_entries(
    word: &str,
    entries: &[ApiEntry],
) -> std::result::Result<LookupEntry, LookupError> {
    let entry = entries
        .first()
        .ok_or_else(|| LookupError::Malformed(format!("empty response for {}", word)))?;

    let phonetic = entry
        .phonetic
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .or_else(|| {
            entry
                .phonetics
                .iter()
                .filter_map(|p| p.text.as_deref())
                .find(|t| !t.trim().is_empty())
        })
        .unwrap_or_default()
        .to_string();

    let meaning = entry
        .meanings
        .first()
        .and_then(|m| {
            m.definitions
                .first()
                .filter(|d| !d.definition.trim().is_empty())
                .map(|d| {
                    if m.part_of_speech.is_empty() {
                        d.definition.clone()
                    } else {
                        format!("{}. {}", m.part_of_speech, d.definition)
                    }
                })
        })
        .ok_or_else(|| LookupError::Malformed(format!("no definition for {}", word)))?;

    let examples = entry
        .meanings
        .iter()
        .flat_map(|m| m.definitions.iter())
        .filter_map(|d| d.example.clone())
        .filter(|e| !e.trim().is_empty())
        .take(MAX_EXAMPLES)
        .collect();

    Ok(LookupEntry {
        phonetic,
        meaning,
        examples,
    })
}

/// HTTP client for the dictionary API
#[derive(Clone)]
pub struct HttpLookup {
    client: Client,
    base_url: Url,
}

impl HttpLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Internal(format!("http client: {}", e)))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Internal(format!("dictionary url {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Internal(format!(
                "dictionary url {:?} cannot take a path",
                base_url.as_str()
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Entry URL for a word, with the word as one encoded path segment.
    pub fn word_url(&self, word: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(word);
        }
        url
    }
}

fn transport(error: reqwest::Error) -> LookupError {
    if error.is_timeout() {
        LookupError::Timeout
    } else {
        LookupError::Transport(error.to_string())
    }
}

impl DictionaryLookup for HttpLookup {
    async fn lookup(&self, word: &str) -> std::result::Result<LookupEntry, LookupError> {
        let resp = self
            .client
            .get(self.word_url(word))
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(word.to_string()));
        }
        if !resp.status().is_success() {
            return Err(LookupError::Transport(format!(
                "dictionary returned {}",
                resp.status().as_u16()
            )));
        }

        let entries: Vec<ApiEntry> = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout
            } else {
                LookupError::Malformed(e.to_string())
            }
        })?;

        parse_entries(word, &entries)
    }
}

/// Lookup strategy selected by configuration
pub enum DictionaryBackend {
    Network(HttpLookup),
    Static(StaticLookup),
}

impl DictionaryLookup for DictionaryBackend {
    async fn lookup(&self, word: &str) -> std::result::Result<LookupEntry, LookupError> {
        match self {
            DictionaryBackend::Network(lookup) => lookup.lookup(word).await,
            DictionaryBackend::Static(lookup) => lookup.lookup(word).await,
        }
    }
}

/// Load a static dictionary from a JSON object of word to entry.
pub async fn load_static_dictionary(path: &Path) -> Result<StaticLookup> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ApiError::Internal(format!("reading {}: {}", path.display(), e)))?;
    let entries: HashMap<String, LookupEntry> = serde_json::from_str(&raw)
        .map_err(|e| ApiError::Internal(format!("parsing {}: {}", path.display(), e)))?;

    let mut lookup = StaticLookup::new();
    for (word, entry) in entries {
        lookup.insert(&word, entry);
    }
    tracing::info!("Loaded {} static dictionary entries", lookup.len());
    Ok(lookup)
}
