use axum::extract::State;
use axum::Json;

use crate::models::chat::{IngestRequest, RetrieveRequest, RetrieveResponse, RetrievedChunkDto};
use crate::services::ingest::IngestReport;
use crate::state::AppState;
use crate::utils::error::ApiError;

pub async fn ingest_handler(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestReport>, ApiError> {
    let report = state.ingest_service.ingest(request.documents).await?;
    Ok(Json(report))
}

/// Direct retrieval surface, mostly for seeding verification and debugging.
pub async fn retrieve_handler(
    State(state): State<AppState>,
    Json(request): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    let top_k = request.top_k.unwrap_or(state.settings.rag.retrieval_top_k);
    let score_threshold = request
        .score_threshold
        .unwrap_or(state.settings.rag.score_threshold);

    let results = state
        .retriever
        .retrieve(&request.query, top_k, score_threshold, request.filters)
        .await?;

    Ok(Json(RetrieveResponse {
        results: results
            .into_iter()
            .map(|r| RetrievedChunkDto {
                content: r.content,
                score: r.score,
                metadata: r.metadata,
            })
            .collect(),
    }))
}
