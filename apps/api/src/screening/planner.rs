//! Requirement Normalizer — turns a job title and free-text requirements
//! into a structured `RequirementPlan`.
//!
//! The LLM does the decomposition; a deterministic synthesis path covers
//! empty requirements and LLM failures, so planning only ever fails on a
//! blank job title.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::screening::prompts::{PLAN_PROMPT_TEMPLATE, PLAN_SYSTEM};

/// A single decomposed requirement a candidate is scored against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub label: String,
    pub detail: String,
    pub is_required: bool,
}

/// The screening plan for one request: normalized job context plus the
/// ordered evaluation criteria. Built once, shared read-only across all
/// candidate evaluations of that request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementPlan {
    pub job_title: String,
    pub normalized_role: String,
    /// Never empty — synthesis guarantees at least one criterion.
    pub criteria: Vec<Criterion>,
}

/// Shape the planning LLM call returns; `job_title` is attached afterwards.
#[derive(Debug, Deserialize)]
struct LlmPlan {
    normalized_role: String,
    criteria: Vec<Criterion>,
}

/// The normalizer seam. Carried in `AppState` as `Arc<dyn RequirementNormalizer>`
/// so tests can substitute a deterministic planner.
#[async_trait]
pub trait RequirementNormalizer: Send + Sync {
    async fn plan(&self, job_title: &str, requirements: &str)
        -> Result<RequirementPlan, AppError>;
}

/// LLM-backed normalizer with deterministic fallback.
pub struct LlmPlanner {
    llm: LlmClient,
}

impl LlmPlanner {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl RequirementNormalizer for LlmPlanner {
    async fn plan(
        &self,
        job_title: &str,
        requirements: &str,
    ) -> Result<RequirementPlan, AppError> {
        let job_title = job_title.trim();
        if job_title.is_empty() {
            return Err(AppError::Planning("job_title must not be empty".to_string()));
        }

        let prompt = PLAN_PROMPT_TEMPLATE
            .replace("{job_title}", job_title)
            .replace("{requirements}", requirements.trim());

        match self.llm.call_json::<LlmPlan>(&prompt, PLAN_SYSTEM).await {
            Ok(plan) if !plan.criteria.is_empty() => {
                info!(
                    "Planned {} criteria for '{}'",
                    plan.criteria.len(),
                    job_title
                );
                Ok(RequirementPlan {
                    job_title: job_title.to_string(),
                    normalized_role: plan.normalized_role,
                    criteria: plan.criteria,
                })
            }
            Ok(_) => {
                warn!("Planner LLM returned no criteria — synthesizing from request text");
                Ok(synthesize_plan(job_title, requirements))
            }
            Err(e) => {
                warn!("Planner LLM call failed ({e}) — synthesizing from request text");
                Ok(synthesize_plan(job_title, requirements))
            }
        }
    }
}

/// Deterministic plan synthesis from the raw request text.
///
/// Requirements are split into one criterion per line/clause; with no usable
/// requirements text, generic criteria are derived from the job title so the
/// plan is never empty.
pub fn synthesize_plan(job_title: &str, requirements: &str) -> RequirementPlan {
    let job_title = job_title.trim();

    let mut criteria: Vec<Criterion> = requirements
        .split(['\n', ';'])
        .map(|clause| clause.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|clause| clause.len() > 2)
        .map(|clause| Criterion {
            label: clause.to_string(),
            detail: format!("Candidate satisfies: {clause}"),
            is_required: true,
        })
        .collect();

    if criteria.is_empty() {
        criteria = vec![
            Criterion {
                label: format!("Relevant experience as {job_title}"),
                detail: format!(
                    "Candidate has professional experience directly relevant to the role of {job_title}"
                ),
                is_required: true,
            },
            Criterion {
                label: format!("Core skills of a {job_title}"),
                detail: format!(
                    "Candidate demonstrates the core technical skills expected of a {job_title}"
                ),
                is_required: true,
            },
            Criterion {
                label: "Career progression".to_string(),
                detail: "Candidate shows growth in scope or responsibility over time".to_string(),
                is_required: false,
            },
        ];
    }

    let normalized_role = if requirements.trim().is_empty() {
        format!("Role: {job_title}.")
    } else {
        format!("Role: {job_title}. Stated requirements: {}", requirements.trim())
    };

    RequirementPlan {
        job_title: job_title.to_string(),
        normalized_role,
        criteria,
    }
}
