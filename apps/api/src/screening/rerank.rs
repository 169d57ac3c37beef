//! Reranker — coarse relevance ordering of retrieved candidates before the
//! expensive per-criterion scoring pass.
//!
//! Default: `KeywordReranker` (pure-Rust, deterministic, fully testable).
//! Alternative: `LlmReranker` (semantic judgment via the reasoning service).
//! `AppState` holds an `Arc<dyn Reranker>`, swapped at startup via config.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::corpus::CandidateRecord;
use crate::llm_client::LlmClient;
use crate::screening::planner::RequirementPlan;
use crate::screening::prompts::{RERANK_PROMPT_TEMPLATE, RERANK_SYSTEM};
use crate::screening::retrieval::query_terms;

/// Concurrent relevance judgments for the LLM backend.
const LLM_RERANK_CONCURRENCY: usize = 4;
/// Longest résumé slice sent per relevance judgment.
const MAX_RERANK_CHARS: usize = 2000;

/// A candidate paired with its coarse relevance score.
/// `rerank_score` is on a 0.0–1.0 scale, comparable within one request only.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub record: CandidateRecord,
    pub rerank_score: f32,
}

/// The reranker seam. Output is sorted by `rerank_score` descending with
/// ties broken by corpus id ascending, so ordering is reproducible.
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(
        &self,
        candidates: Vec<CandidateRecord>,
        plan: &RequirementPlan,
    ) -> Vec<RankedCandidate>;
}

/// Sorts descending by score; equal scores order by corpus id ascending.
fn sort_ranked(ranked: &mut [RankedCandidate]) {
    ranked.sort_by(|a, b| {
        b.rerank_score
            .partial_cmp(&a.rerank_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.record.id.cmp(&b.record.id))
    });
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordReranker — default backend
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic reranker: the score is the fraction of plan terms evidenced
/// in the résumé text.
pub struct KeywordReranker;

#[async_trait]
impl Reranker for KeywordReranker {
    async fn rerank(
        &self,
        candidates: Vec<CandidateRecord>,
        plan: &RequirementPlan,
    ) -> Vec<RankedCandidate> {
        let terms = query_terms(plan);

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .map(|record| {
                let rerank_score = keyword_overlap(&record.raw_text, &terms);
                RankedCandidate {
                    record,
                    rerank_score,
                }
            })
            .collect();

        sort_ranked(&mut ranked);
        ranked
    }
}

/// Fraction of `terms` present in `text`, case-insensitive. 0.0 with no terms.
fn keyword_overlap(text: &str, terms: &[String]) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }
    let lower = text.to_lowercase();
    let matched = terms.iter().filter(|t| lower.contains(t.as_str())).count();
    matched as f32 / terms.len() as f32
}

// ────────────────────────────────────────────────────────────────────────────
// LlmReranker — semantic backend
// ────────────────────────────────────────────────────────────────────────────

/// Shape of one relevance judgment from the reasoning service.
#[derive(Debug, Deserialize)]
struct RelevanceVerdict {
    relevant: bool,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

fn default_confidence() -> f32 {
    0.5
}

/// Semantic reranker: one yes/no relevance judgment per candidate, fanned
/// out under a small concurrency bound. A failed judgment degrades that
/// candidate to 0.0 relevance instead of failing the batch.
pub struct LlmReranker {
    llm: LlmClient,
}

impl LlmReranker {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Reranker for LlmReranker {
    async fn rerank(
        &self,
        candidates: Vec<CandidateRecord>,
        plan: &RequirementPlan,
    ) -> Vec<RankedCandidate> {
        let semaphore = Arc::new(Semaphore::new(LLM_RERANK_CONCURRENCY));
        let mut set: JoinSet<(usize, f32)> = JoinSet::new();

        for (idx, record) in candidates.iter().enumerate() {
            let llm = self.llm.clone();
            let sem = semaphore.clone();
            let prompt = RERANK_PROMPT_TEMPLATE
                .replace("{normalized_role}", &plan.normalized_role)
                .replace(
                    "{resume_text}",
                    &record.raw_text.chars().take(MAX_RERANK_CHARS).collect::<String>(),
                );
            let candidate_id = record.id;

            set.spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                let score = match llm.call_json::<RelevanceVerdict>(&prompt, RERANK_SYSTEM).await
                {
                    Ok(verdict) => relevance_score(&verdict),
                    Err(e) => {
                        warn!("Relevance judgment failed for candidate {candidate_id}: {e}");
                        0.0
                    }
                };
                (idx, score)
            });
        }

        let mut scores = vec![0.0_f32; candidates.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, score)) => scores[idx] = score,
                Err(e) => warn!("Relevance judgment task failed: {e}"),
            }
        }

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(record, rerank_score)| RankedCandidate {
                record,
                rerank_score,
            })
            .collect();

        sort_ranked(&mut ranked);
        ranked
    }
}

/// Collapses a yes/no judgment with confidence into a 0.0–1.0 score.
fn relevance_score(verdict: &RelevanceVerdict) -> f32 {
    let base = if verdict.relevant { 0.5 } else { 0.0 };
    (base + verdict.confidence.clamp(0.0, 1.0) * 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::planner::synthesize_plan;

    fn make_record(id: i64, text: &str) -> CandidateRecord {
        CandidateRecord {
            id,
            raw_text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_keyword_reranker_orders_by_overlap() {
        let plan = synthesize_plan("Engineer", "rust\nkafka\ndocker");
        let ranked = KeywordReranker
            .rerank(
                vec![
                    make_record(1, "java spring developer"),
                    make_record(2, "rust and kafka and docker daily"),
                    make_record(3, "rust only"),
                ],
                &plan,
            )
            .await;

        let ids: Vec<i64> = ranked.iter().map(|r| r.record.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(ranked[0].rerank_score > ranked[1].rerank_score);
    }

    #[tokio::test]
    async fn test_keyword_reranker_ties_break_by_id_ascending() {
        let plan = synthesize_plan("Engineer", "rust");
        let ranked = KeywordReranker
            .rerank(
                vec![
                    make_record(9, "rust engineer"),
                    make_record(4, "rust engineer"),
                ],
                &plan,
            )
            .await;

        let ids: Vec<i64> = ranked.iter().map(|r| r.record.id).collect();
        assert_eq!(ids, vec![4, 9], "equal scores must order by id");
    }

    #[tokio::test]
    async fn test_keyword_reranker_is_deterministic() {
        let plan = synthesize_plan("Engineer", "rust\ndocker");
        let records = vec![
            make_record(1, "docker"),
            make_record(2, "rust docker"),
            make_record(3, "rust"),
        ];
        let first = KeywordReranker.rerank(records.clone(), &plan).await;
        let second = KeywordReranker.rerank(records, &plan).await;
        let first_ids: Vec<i64> = first.iter().map(|r| r.record.id).collect();
        let second_ids: Vec<i64> = second.iter().map(|r| r.record.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn test_keyword_overlap_bounds() {
        let terms = vec!["rust".to_string(), "kafka".to_string()];
        assert_eq!(keyword_overlap("neither here", &terms), 0.0);
        assert_eq!(keyword_overlap("rust and kafka", &terms), 1.0);
        assert_eq!(keyword_overlap("anything", &[]), 0.0);
    }

    #[test]
    fn test_relevance_score_formula() {
        let yes = RelevanceVerdict {
            relevant: true,
            confidence: 0.8,
        };
        assert!((relevance_score(&yes) - 0.9).abs() < 1e-6);

        let no = RelevanceVerdict {
            relevant: false,
            confidence: 0.8,
        };
        assert!((relevance_score(&no) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_relevance_verdict_confidence_defaults() {
        let verdict: RelevanceVerdict = serde_json::from_str(r#"{"relevant": true}"#).unwrap();
        assert!((verdict.confidence - 0.5).abs() < f32::EPSILON);
    }
}
