//! Axum route handlers for the screening API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::screening::pipeline::{score_from_dataset, PipelineLimits, ResultItem, ScoreRequest};
use crate::state::AppState;

/// Response envelope for `POST /api/v1/score`.
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub results: Vec<ResultItem>,
}

/// POST /api/v1/score
///
/// Full screening pipeline: plan → retrieve → rerank → truncate → evaluate →
/// assemble. Returns a ranked, explained short-list of at most `top_n`
/// candidates — fewer when retrieval comes up short, which is not an error.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let limits = PipelineLimits {
        overfetch: state.config.retrieval_overfetch,
        concurrency: state.config.scoring_concurrency,
    };

    let results = score_from_dataset(
        &state.corpus,
        state.planner.as_ref(),
        state.reranker.as_ref(),
        &state.scorer,
        request,
        limits,
    )
    .await?;

    Ok(Json(ScoreResponse { results }))
}
