pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocab_core::{EnrichmentOrchestrator, StaticLookup, StudyService};

use crate::config::{LookupMode, ServerConfig};
use crate::db::SqliteStore;
use crate::services::dictionary::{load_static_dictionary, DictionaryBackend, HttpLookup};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub service: Arc<Mutex<StudyService<SqliteStore>>>,
    pub enricher: Arc<EnrichmentOrchestrator<DictionaryBackend>>,
}

impl AppState {
    pub fn new(store: SqliteStore, enricher: EnrichmentOrchestrator<DictionaryBackend>) -> Self {
        let store = Arc::new(store);
        Self {
            service: Arc::new(Mutex::new(StudyService::new(store.clone()))),
            store,
            enricher: Arc::new(enricher),
        }
    }
}

/// Pick the dictionary backend for the configured lookup mode
pub async fn build_lookup(config: &ServerConfig) -> error::Result<DictionaryBackend> {
    match config.lookup_mode {
        LookupMode::Network => Ok(DictionaryBackend::Network(HttpLookup::new(
            &config.dictionary_api_url,
            config.lookup_timeout,
        )?)),
        LookupMode::Static => {
            let lookup = match &config.static_dictionary_path {
                Some(path) => load_static_dictionary(path).await?,
                None => StaticLookup::new(),
            };
            Ok(DictionaryBackend::Static(lookup))
        }
    }
}

/// Build the full router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Corpus routes
        .route("/api/corpus/analyze", post(routes::corpus::analyze))
        .route("/api/corpus/import", post(routes::corpus::import))
        .route("/api/corpus/imports", get(routes::corpus::list_imports))
        // Word routes
        .route("/api/words", get(routes::words::list).post(routes::words::create))
        .route("/api/words/:id", get(routes::words::get))
        // Study routes
        .route("/api/study/start", post(routes::study::start))
        .route("/api/study/current", get(routes::study::current))
        .route("/api/study/answer", post(routes::study::answer))
        // Plan routes
        .route("/api/plan", get(routes::plan::get).put(routes::plan::update))
        // Bookmark routes
        .route(
            "/api/bookmarks",
            get(routes::bookmarks::list).delete(routes::bookmarks::clear),
        )
        .route(
            "/api/bookmarks/:id",
            post(routes::bookmarks::add).delete(routes::bookmarks::remove),
        )
        .route("/api/bookmarks/:id/toggle", post(routes::bookmarks::toggle))
        // Stats routes
        .route("/api/stats/today", get(routes::stats::today))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    tracing::info!("Connecting to database...");
    let store = SqliteStore::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    store.run_migrations().await?;

    tracing::info!("Using {} dictionary lookup", config.lookup_mode);
    let lookup = build_lookup(&config).await?;
    let enricher = EnrichmentOrchestrator::new(lookup, config.lookup_delay);

    let app = build_router(AppState::new(store, enricher));

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
