//! Candidate Retriever — queries the Corpus Store for an initial candidate
//! set. Over-fetches relative to `top_n` so the reranker has room to work.

use std::sync::Arc;

use tracing::info;

use crate::corpus::{CandidateRecord, CorpusStore};
use crate::errors::AppError;
use crate::screening::planner::RequirementPlan;

/// Query terms are capped so a long requirements list does not flood the store.
const MAX_QUERY_TERMS: usize = 24;

/// Words carrying no retrieval signal on their own.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "for", "in", "of", "on", "or", "the", "to", "with",
];

pub struct CandidateRetriever {
    store: Arc<dyn CorpusStore>,
}

impl CandidateRetriever {
    pub fn new(store: Arc<dyn CorpusStore>) -> Self {
        Self { store }
    }

    /// Fetches up to `limit` candidates relevant to the plan. An empty corpus
    /// yields an empty result; only an unreachable store is an error.
    pub async fn retrieve(
        &self,
        plan: &RequirementPlan,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, AppError> {
        let terms = query_terms(plan);
        let candidates = self
            .store
            .search(&terms, limit)
            .await
            .map_err(|e| AppError::Retrieval(e.to_string()))?;

        info!(
            "Retrieved {} candidates (limit {}) for '{}'",
            candidates.len(),
            limit,
            plan.job_title
        );
        Ok(candidates)
    }
}

/// Lowercased search terms drawn from the job title and criterion labels,
/// deduplicated in first-seen order.
pub fn query_terms(plan: &RequirementPlan) -> Vec<String> {
    let mut terms = Vec::new();
    let mut seen = std::collections::HashSet::new();

    let sources = std::iter::once(plan.job_title.as_str())
        .chain(plan.criteria.iter().map(|c| c.label.as_str()));

    for source in sources {
        for word in source.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#') {
            let word = word.to_lowercase();
            if word.len() < 2 || STOPWORDS.contains(&word.as_str()) {
                continue;
            }
            if seen.insert(word.clone()) {
                terms.push(word);
            }
            if terms.len() >= MAX_QUERY_TERMS {
                return terms;
            }
        }
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusError, FileCorpusStore};
    use crate::screening::planner::synthesize_plan;
    use async_trait::async_trait;

    struct DownStore;

    #[async_trait]
    impl CorpusStore for DownStore {
        async fn search(
            &self,
            _query_terms: &[String],
            _limit: usize,
        ) -> Result<Vec<CandidateRecord>, CorpusError> {
            Err(CorpusError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_query_terms_from_title_and_criteria() {
        let plan = synthesize_plan("Backend Engineer", "Rust experience\nKafka");
        let terms = query_terms(&plan);
        assert!(terms.contains(&"backend".to_string()));
        assert!(terms.contains(&"rust".to_string()));
        assert!(terms.contains(&"kafka".to_string()));
    }

    #[test]
    fn test_query_terms_deduplicated_and_lowercased() {
        let plan = synthesize_plan("Rust Engineer", "Rust\nrust tooling");
        let terms = query_terms(&plan);
        assert_eq!(terms.iter().filter(|t| t.as_str() == "rust").count(), 1);
    }

    #[test]
    fn test_query_terms_drop_stopwords_and_capped() {
        let requirements = (0..60)
            .map(|i| format!("skill{i} of the and"))
            .collect::<Vec<_>>()
            .join("\n");
        let plan = synthesize_plan("Engineer", &requirements);
        let terms = query_terms(&plan);
        assert!(terms.len() <= MAX_QUERY_TERMS);
        assert!(!terms.iter().any(|t| t == "the" || t == "of" || t == "and"));
    }

    #[test]
    fn test_query_terms_keep_symbolic_skills() {
        let plan = synthesize_plan("Systems Engineer", "c++ and c# internals");
        let terms = query_terms(&plan);
        assert!(terms.contains(&"c++".to_string()));
        assert!(terms.contains(&"c#".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_store_maps_to_retrieval_error() {
        let retriever = CandidateRetriever::new(Arc::new(DownStore));
        let plan = synthesize_plan("Engineer", "");
        let err = retriever.retrieve(&plan, 10).await.unwrap_err();
        assert!(matches!(err, AppError::Retrieval(_)));
    }

    #[tokio::test]
    async fn test_empty_corpus_is_empty_result_not_error() {
        let retriever =
            CandidateRetriever::new(Arc::new(FileCorpusStore::from_records(vec![])));
        let plan = synthesize_plan("Engineer", "");
        let candidates = retriever.retrieve(&plan, 10).await.unwrap();
        assert!(candidates.is_empty());
    }
}
