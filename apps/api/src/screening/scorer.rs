//! Criterion Scorer — evaluates a candidate against each criterion in the
//! requirement plan, one score + reasoning pair per criterion.
//!
//! Scoring is the failure-prone stage (it depends on the reasoning service),
//! so the trait is total: a failed criterion call becomes an entry marked
//! unavailable rather than vanishing, and a fully failed candidate degrades
//! to an empty list — never an aborted batch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::LlmClient;
use crate::screening::parser::ParsedResume;
use crate::screening::planner::RequirementPlan;
use crate::screening::prompts::{SCORE_PROMPT_TEMPLATE, SCORE_SYSTEM};

/// Longest résumé slice sent to the reasoning service per criterion call.
const MAX_RESUME_CHARS: usize = 6000;

/// One criterion's evaluation. `score` is on the pipeline-wide 0–100 scale;
/// `unavailable` marks entries whose evaluation failed (score pinned to 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub criterion: String,
    pub score: f32,
    pub reasoning: String,
    #[serde(default)]
    pub unavailable: bool,
}

/// The scorer seam. Carried in `AppState` as `Arc<dyn CriterionScorer>`.
/// Implementations must be total — degradation is expressed in the entries,
/// not as an error.
#[async_trait]
pub trait CriterionScorer: Send + Sync {
    async fn score(
        &self,
        parsed: &ParsedResume,
        raw_text: &str,
        plan: &RequirementPlan,
    ) -> Vec<ScoreEntry>;
}

/// Shape of one criterion verdict from the reasoning service.
#[derive(Debug, Deserialize)]
struct CriterionVerdict {
    score: f32,
    reasoning: String,
}

/// Reasoning-service-backed scorer: one call per criterion, sequential per
/// candidate (candidates themselves fan out concurrently upstream).
pub struct LlmCriterionScorer {
    llm: LlmClient,
}

impl LlmCriterionScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CriterionScorer for LlmCriterionScorer {
    async fn score(
        &self,
        parsed: &ParsedResume,
        raw_text: &str,
        plan: &RequirementPlan,
    ) -> Vec<ScoreEntry> {
        let parsed_json =
            serde_json::to_string(parsed).unwrap_or_else(|_| "{}".to_string());
        let resume_excerpt: String = raw_text.chars().take(MAX_RESUME_CHARS).collect();

        let mut entries = Vec::with_capacity(plan.criteria.len());

        for criterion in &plan.criteria {
            let prompt = SCORE_PROMPT_TEMPLATE
                .replace("{criterion_label}", &criterion.label)
                .replace("{criterion_detail}", &criterion.detail)
                .replace("{normalized_role}", &plan.normalized_role)
                .replace("{parsed_json}", &parsed_json)
                .replace("{resume_text}", &resume_excerpt);

            match self
                .llm
                .call_json::<CriterionVerdict>(&prompt, SCORE_SYSTEM)
                .await
            {
                Ok(verdict) => entries.push(scored_entry(&criterion.label, verdict)),
                Err(e) => {
                    warn!(
                        "Criterion '{}' scoring failed: {e} — marking unavailable",
                        criterion.label
                    );
                    entries.push(unavailable_entry(&criterion.label, &e.to_string()));
                }
            }
        }

        entries
    }
}

fn scored_entry(label: &str, verdict: CriterionVerdict) -> ScoreEntry {
    let reasoning = if verdict.reasoning.trim().is_empty() {
        "No reasoning provided".to_string()
    } else {
        verdict.reasoning
    };
    ScoreEntry {
        criterion: label.to_string(),
        score: verdict.score.clamp(0.0, 100.0),
        reasoning,
        unavailable: false,
    }
}

fn unavailable_entry(label: &str, reason: &str) -> ScoreEntry {
    ScoreEntry {
        criterion: label.to_string(),
        score: 0.0,
        reasoning: format!("score unavailable: {reason}"),
        unavailable: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_entry_clamps_into_scale() {
        let entry = scored_entry(
            "Rust experience",
            CriterionVerdict {
                score: 140.0,
                reasoning: "Overshoot".to_string(),
            },
        );
        assert_eq!(entry.score, 100.0);
        assert!(!entry.unavailable);

        let entry = scored_entry(
            "Rust experience",
            CriterionVerdict {
                score: -5.0,
                reasoning: "Undershoot".to_string(),
            },
        );
        assert_eq!(entry.score, 0.0);
    }

    #[test]
    fn test_scored_entry_backfills_empty_reasoning() {
        let entry = scored_entry(
            "SQL",
            CriterionVerdict {
                score: 50.0,
                reasoning: "   ".to_string(),
            },
        );
        assert_eq!(entry.reasoning, "No reasoning provided");
    }

    #[test]
    fn test_unavailable_entry_is_marked_and_zeroed() {
        let entry = unavailable_entry("Kafka", "timeout");
        assert!(entry.unavailable);
        assert_eq!(entry.score, 0.0);
        assert!(entry.reasoning.contains("score unavailable"));
        assert!(entry.reasoning.contains("timeout"));
    }

    #[test]
    fn test_verdict_deserializes_from_llm_json() {
        let verdict: CriterionVerdict =
            serde_json::from_str(r#"{"score": 72.5, "reasoning": "Cites 6 years of Rust"}"#)
                .unwrap();
        assert!((verdict.score - 72.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unavailable_flag_defaults_false_in_json() {
        let entry: ScoreEntry = serde_json::from_str(
            r#"{"criterion": "Rust", "score": 80.0, "reasoning": "solid"}"#,
        )
        .unwrap();
        assert!(!entry.unavailable);
    }
}
