//! Common test utilities for integration tests.
//!
//! Every context gets its own in-memory SQLite database and a static
//! dictionary, so tests need no network and no setup.

pub mod fixtures;

use std::time::Duration;

use axum::Router;
use axum_test::TestServer;

use vocab_core::types::{NewWord, WordId};
use vocab_core::{EnrichmentOrchestrator, VocabularyStore};
use vocab_server::db::SqliteStore;
use vocab_server::services::dictionary::DictionaryBackend;
use vocab_server::{build_router, AppState};

/// Test context holding application state and the router.
pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Create a new test context with a fresh database.
    ///
    /// # Panics
    /// Panics if the in-memory database cannot be created or migrated.
    pub async fn new() -> Self {
        let store = SqliteStore::connect_in_memory()
            .await
            .expect("Failed to open in-memory database");

        store
            .run_migrations()
            .await
            .expect("Failed to run migrations");

        let lookup = DictionaryBackend::Static(fixtures::static_dictionary());
        let enricher = EnrichmentOrchestrator::new(lookup, Duration::ZERO);
        let state = AppState::new(store, enricher);
        let app = build_router(state.clone());

        Self { state, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Test server over the router.
    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Insert a manual word directly into the store.
    pub async fn add_word(&self, text: &str) -> WordId {
        self.state
            .store
            .add_word(NewWord::manual(text))
            .await
            .expect("Failed to add test word")
    }
}
