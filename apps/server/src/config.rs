//! Server configuration from environment variables

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DICTIONARY_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// Which dictionary backs enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    Network,
    Static,
}

impl FromStr for LookupMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "network" => Ok(Self::Network),
            "static" | "mock" => Ok(Self::Static),
            other => Err(format!("unknown lookup mode {:?}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub lookup_mode: LookupMode,
    pub dictionary_api_url: String,
    pub lookup_delay: Duration,
    pub lookup_timeout: Duration,
    /// JSON dictionary used in static mode.
    pub static_dictionary_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite://vocab.db?mode=rwc".to_string(),
            lookup_mode: LookupMode::Network,
            dictionary_api_url: DEFAULT_DICTIONARY_API_URL.to_string(),
            lookup_delay: Duration::from_millis(200),
            lookup_timeout: Duration::from_secs(10),
            static_dictionary_path: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from a variable source. Unparseable values keep the default.
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parsed(&get, "PORT", defaults.port),
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            lookup_mode: parsed(&get, "LOOKUP_MODE", defaults.lookup_mode),
            dictionary_api_url: get("DICTIONARY_API_URL").unwrap_or(defaults.dictionary_api_url),
            lookup_delay: Duration::from_millis(parsed(&get, "LOOKUP_DELAY_MS", 200)),
            lookup_timeout: Duration::from_secs(parsed(&get, "LOOKUP_TIMEOUT_SECS", 10)),
            static_dictionary_path: get("STATIC_DICTIONARY_PATH").map(PathBuf::from),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T, F>(get: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!("invalid {}={:?} ({}), using {}", key, raw, e, default);
            default
        }),
        None => default,
    }
}

impl Display for LookupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupMode::Network => write!(f, "network"),
            LookupMode::Static => write!(f, "static"),
        }
    }
}
