// All LLM prompt constants for the screening pipeline.

/// System prompt for requirement planning — enforces JSON-only output.
pub const PLAN_SYSTEM: &str =
    "You are an expert technical recruiter decomposing a job opening into \
    evaluation criteria for candidate screening. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Requirement planning prompt template.
/// Replace `{job_title}` and `{requirements}` before sending.
pub const PLAN_PROMPT_TEMPLATE: &str = r#"Decompose the following job opening into a screening plan.

Return a JSON object with this EXACT schema (no extra fields):
{
  "normalized_role": "One-paragraph normalized description of the role and what a strong candidate looks like",
  "criteria": [
    {
      "label": "5+ years backend experience",
      "detail": "Candidate has at least five years of professional backend development experience",
      "is_required": true
    }
  ]
}

Rules:
- Produce between 3 and 8 criteria, ordered most important first.
- Each criterion must be independently checkable against a résumé.
- HARD REQUIREMENTS (phrases like "required", "must have", minimum years) get is_required = true.
- Nice-to-haves ("preferred", "a plus", "bonus") get is_required = false.
- If the requirements text is empty, derive criteria from the job title alone.

JOB TITLE:
{job_title}

REQUIREMENTS:
{requirements}"#;

/// System prompt for per-criterion scoring — enforces JSON-only output.
pub const SCORE_SYSTEM: &str =
    "You are an expert technical recruiter judging how well a candidate \
    satisfies one specific requirement. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Per-criterion scoring prompt template.
/// Replace: {criterion_label}, {criterion_detail}, {normalized_role},
///          {parsed_json}, {resume_text}
pub const SCORE_PROMPT_TEMPLATE: &str = r#"Judge how well the candidate below satisfies ONE criterion.

Return a JSON object with this EXACT schema:
{
  "score": 72.5,
  "reasoning": "Two or three sentences citing concrete evidence from the résumé"
}

Rules:
- "score" is a number from 0 to 100. 0 = no evidence at all, 100 = overwhelming direct evidence.
- Base the score ONLY on the résumé text and extracted attributes — never invent facts.
- "reasoning" must cite the evidence (or its absence) that drove the score.

ROLE:
{normalized_role}

CRITERION: {criterion_label}
{criterion_detail}

EXTRACTED ATTRIBUTES:
{parsed_json}

RESUME:
{resume_text}"#;

/// System prompt for LLM reranking — enforces JSON-only output.
pub const RERANK_SYSTEM: &str =
    "You judge whether a résumé is relevant to a role. \
    You MUST respond with valid JSON only, no markdown fences, no extra text.";

/// Coarse relevance prompt for the LLM reranker.
/// Replace `{normalized_role}` and `{resume_text}`.
pub const RERANK_PROMPT_TEMPLATE: &str = r#"Is this candidate plausibly relevant to the role below?

Return a JSON object: {"relevant": true, "confidence": 0.8}
- "relevant": whether the résumé is worth detailed scoring for this role.
- "confidence": 0.0 to 1.0.

ROLE:
{normalized_role}

RESUME:
{resume_text}"#;
