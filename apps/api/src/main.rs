mod config;
mod corpus;
mod db;
mod errors;
mod llm_client;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, CorpusBackend};
use crate::corpus::{CorpusStore, FileCorpusStore, PgCorpusStore};
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::planner::{LlmPlanner, RequirementNormalizer};
use crate::screening::rerank::{KeywordReranker, LlmReranker, Reranker};
use crate::screening::scorer::{CriterionScorer, LlmCriterionScorer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the corpus store backend
    let corpus: Arc<dyn CorpusStore> = match &config.corpus_backend {
        CorpusBackend::Postgres(url) => {
            let pool = create_pool(url).await?;
            Arc::new(PgCorpusStore::new(pool))
        }
        CorpusBackend::File(path) => Arc::new(FileCorpusStore::load(Path::new(path))?),
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Wire pipeline collaborators. Reranker: KeywordReranker by default —
    // swap via RERANKER_BACKEND.
    let planner: Arc<dyn RequirementNormalizer> = Arc::new(LlmPlanner::new(llm.clone()));
    let reranker: Arc<dyn Reranker> = match config.reranker_backend.as_str() {
        "llm" => Arc::new(LlmReranker::new(llm.clone())),
        _ => Arc::new(KeywordReranker),
    };
    let scorer: Arc<dyn CriterionScorer> = Arc::new(LlmCriterionScorer::new(llm));
    info!("Reranker backend: {}", config.reranker_backend);

    // Build app state
    let state = AppState {
        corpus,
        planner,
        reranker,
        scorer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
