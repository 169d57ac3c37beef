//! Pipeline Orchestrator — sequences plan → retrieve → rerank → truncate →
//! per-candidate evaluation → assembly.
//!
//! Per-candidate work (parse → score → aggregate) fans out under a bounded
//! concurrency limit and shares only the read-only plan. Results are buffered
//! into rank-addressed slots so assembly never depends on completion order,
//! and the `JoinSet` aborts in-flight evaluations if the request is dropped.
//!
//! Candidate-level failures degrade the affected item; only planning and
//! retrieval failures abort the request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::corpus::CorpusStore;
use crate::errors::AppError;
use crate::screening::parser::{parse_resume, ParsedResume};
use crate::screening::planner::{RequirementNormalizer, RequirementPlan};
use crate::screening::report::{build_report, summary_score, Report};
use crate::screening::rerank::Reranker;
use crate::screening::retrieval::CandidateRetriever;
use crate::screening::scorer::{CriterionScorer, ScoreEntry};

/// One screening request. Immutable once constructed.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub job_title: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    3
}

/// Whether a result item came through the pipeline untouched or with
/// degraded parsing/scoring. Degraded items are still returned — never
/// silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Complete,
    Degraded,
}

/// The externally visible unit of a screening response.
#[derive(Debug, Clone, Serialize)]
pub struct ResultItem {
    /// Dense 0-based position in the final ordered response.
    pub resume_index: usize,
    /// The candidate's corpus id.
    pub original_id: i64,
    /// Coarse relevance provenance from the reranker (0.0–1.0).
    pub rerank_score: f32,
    pub plan: RequirementPlan,
    pub parsed_resume: ParsedResume,
    /// Criterion scores in plan order.
    pub scores: Vec<ScoreEntry>,
    pub report: Report,
    /// Top ordered score, or 0 when nothing was scorable.
    pub summary_score: f32,
    pub raw_resume: String,
    pub outcome: ItemOutcome,
}

/// Fan-out bounds, sourced from config at the handler.
#[derive(Debug, Clone, Copy)]
pub struct PipelineLimits {
    /// Retrieval fetches `top_n × overfetch` candidates.
    pub overfetch: usize,
    /// Concurrent per-candidate evaluations.
    pub concurrency: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            overfetch: 4,
            concurrency: 4,
        }
    }
}

/// Output of one candidate's parse → score → aggregate stage.
struct CandidateEvaluation {
    parsed: ParsedResume,
    scores: Vec<ScoreEntry>,
    report: Report,
}

/// Runs the full screening pipeline for one request.
///
/// The response holds at most `top_n` items, ordered by `summary_score`
/// descending (ties keep rerank order), with `resume_index` assigned only
/// after every retained candidate's evaluation has completed.
pub async fn score_from_dataset(
    store: &Arc<dyn CorpusStore>,
    planner: &dyn RequirementNormalizer,
    reranker: &dyn Reranker,
    scorer: &Arc<dyn CriterionScorer>,
    request: ScoreRequest,
    limits: PipelineLimits,
) -> Result<Vec<ResultItem>, AppError> {
    if request.top_n == 0 {
        return Err(AppError::Validation("top_n must be at least 1".to_string()));
    }

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        "Screening '{}' (top_n {})", request.job_title, request.top_n
    );

    // Plan: one per request, shared read-only across candidate evaluations.
    let plan = Arc::new(
        planner
            .plan(&request.job_title, &request.requirements)
            .await?,
    );

    // Retrieve with over-fetch headroom for the reranker.
    let limit = request.top_n.saturating_mul(limits.overfetch.max(1));
    let retriever = CandidateRetriever::new(store.clone());
    let candidates = retriever.retrieve(&plan, limit).await?;

    if candidates.is_empty() {
        info!(%request_id, "No candidates retrieved — returning empty result");
        return Ok(Vec::new());
    }

    // Rerank, then truncate: the authoritative "who gets scored" cut.
    let mut ranked = reranker.rerank(candidates, &plan).await;
    ranked.truncate(request.top_n);

    // Fan out per-candidate evaluation, bounded by the concurrency limit.
    let semaphore = Arc::new(Semaphore::new(limits.concurrency.max(1)));
    let mut set: JoinSet<(usize, CandidateEvaluation)> = JoinSet::new();

    for (idx, candidate) in ranked.iter().enumerate() {
        let raw_text = candidate.record.raw_text.clone();
        let plan = plan.clone();
        let scorer = scorer.clone();
        let sem = semaphore.clone();

        set.spawn(async move {
            let _permit = sem.acquire_owned().await.ok();
            let parsed = parse_resume(&raw_text);
            let scores = scorer.score(&parsed, &raw_text, &plan).await;
            let report = build_report(&scores);
            (
                idx,
                CandidateEvaluation {
                    parsed,
                    scores,
                    report,
                },
            )
        });
    }

    // Buffer completions into rank-addressed slots; arrival order is irrelevant.
    let mut slots: Vec<Option<CandidateEvaluation>> =
        (0..ranked.len()).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, evaluation)) => slots[idx] = Some(evaluation),
            Err(e) => warn!(%request_id, "Candidate evaluation task failed: {e}"),
        }
    }

    // Assemble in rank order; a lost evaluation degrades its item.
    let expected_entries = plan.criteria.len();
    let mut items: Vec<ResultItem> = ranked
        .into_iter()
        .zip(slots)
        .map(|(candidate, slot)| {
            let (evaluation, task_lost) = match slot {
                Some(evaluation) => (evaluation, false),
                None => (
                    CandidateEvaluation {
                        parsed: ParsedResume::unknown(),
                        scores: Vec::new(),
                        report: build_report(&[]),
                    },
                    true,
                ),
            };

            let degraded = task_lost
                || evaluation.scores.iter().any(|s| s.unavailable)
                || (expected_entries > 0 && evaluation.scores.is_empty());
            if degraded {
                warn!(
                    %request_id,
                    "Candidate {} returned degraded", candidate.record.id
                );
            }

            let summary = summary_score(&evaluation.report);
            ResultItem {
                resume_index: 0, // assigned after the final sort
                original_id: candidate.record.id,
                rerank_score: candidate.rerank_score,
                plan: (*plan).clone(),
                parsed_resume: evaluation.parsed,
                scores: evaluation.scores,
                report: evaluation.report,
                summary_score: summary,
                raw_resume: candidate.record.raw_text,
                outcome: if degraded {
                    ItemOutcome::Degraded
                } else {
                    ItemOutcome::Complete
                },
            }
        })
        .collect();

    // Final order: summary_score descending; stable, so ties keep rerank order.
    items.sort_by(|a, b| {
        b.summary_score
            .partial_cmp(&a.summary_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (index, item) in items.iter_mut().enumerate() {
        item.resume_index = index;
    }

    info!(%request_id, "Assembled {} result items", items.len());
    Ok(items)
}
