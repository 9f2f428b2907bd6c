use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::domain::ConversationSummary;
use crate::models::chat::{CreateSessionRequest, SessionCreated};
use crate::personas;
use crate::services::reset::{ResetAllOutcome, ResetOutcome};
use crate::state::AppState;
use crate::utils::error::ApiError;

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionCreated>, ApiError> {
    let persona = personas::get_persona(&request.npc_id)?;

    let conversation = state
        .session_manager
        .create_session(&request.user_id, persona.to_npc(), request.scenario_id)
        .await?;

    Ok(Json(SessionCreated {
        session_id: conversation.id,
        user_id: conversation.user_id,
        npc_id: request.npc_id,
        started_at: conversation.started_at,
    }))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let summaries = state.session_manager.list_user_sessions(&user_id).await?;
    Ok(Json(summaries))
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationSummary>, ApiError> {
    let conversation = state.session_manager.end_session(&session_id).await?;
    Ok(Json(ConversationSummary::from_conversation(&conversation)))
}

pub async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ResetOutcome>, ApiError> {
    let outcome = state.reset_service.reset_session(&session_id).await?;
    Ok(Json(outcome))
}

pub async fn reset_all_user_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ResetAllOutcome>, ApiError> {
    let outcome = state.reset_service.reset_all_user_sessions(&user_id).await?;
    Ok(Json(outcome))
}

pub async fn analyze_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let conversation = state.session_manager.load_session(&session_id).await?;
    let analysis = state
        .director_service
        .analyze_conversation(&conversation, 6)
        .await?;
    Ok(Json(analysis))
}

pub async fn evaluate_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let conversation = state.session_manager.load_session(&session_id).await?;
    let evaluation = state.evaluation_service.evaluate_session(&conversation).await?;
    Ok(Json(evaluation))
}
