use std::sync::Arc;

use crate::config::Config;
use crate::corpus::CorpusStore;
use crate::screening::planner::RequirementNormalizer;
use crate::screening::rerank::Reranker;
use crate::screening::scorer::CriterionScorer;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every pipeline collaborator sits behind a trait object so tests can wire
/// in deterministic fakes, and backends can be swapped at startup.
#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<dyn CorpusStore>,
    pub planner: Arc<dyn RequirementNormalizer>,
    /// Pluggable reranker. Default: KeywordReranker. Swap via RERANKER_BACKEND env.
    pub reranker: Arc<dyn Reranker>,
    pub scorer: Arc<dyn CriterionScorer>,
    pub config: Config,
}
