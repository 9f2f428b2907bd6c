use std::convert::Infallible;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::Stream;
use futures::StreamExt;
use tracing::info;

use crate::models::chat::{
    ChatRequest, ChatResponse, CompletionInfo, ErrorInfo, MessageChunk, SessionInfo,
};
use crate::personas;
use crate::services::chat_service::ChatStreamEvent;
use crate::state::AppState;
use crate::utils::error::ApiError;

/// Main chat endpoint: send a message to an NPC, get the NPC's reply.
///
/// Unknown sessions are auto-created here on first message. That is a
/// transport-boundary policy: the chat pipeline itself treats a missing
/// session as a typed failure.
pub async fn chat_handler(
    State(state): State<AppState>,
    Path(npc_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    ensure_session(&state, &npc_id, &request.session_id).await?;

    let outcome = state
        .chat_service
        .process_message(&request.session_id, &request.message, request.use_rag)
        .await?;

    Ok(Json(ChatResponse {
        npc_id,
        assistant_message: outcome.response,
        turn_number: outcome.turn_number,
    }))
}

/// Streaming variant: SSE events `session` → `message`* → `done`.
pub async fn chat_stream_handler(
    State(state): State<AppState>,
    Path(npc_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let start_time = Instant::now();

    ensure_session(&state, &npc_id, &request.session_id).await?;

    let session_id = request.session_id.clone();
    let chat_service = state.chat_service.clone();

    let stream = async_stream::stream! {
        yield Ok(create_sse_event("session", &SessionInfo {
            session_id: session_id.clone(),
            npc_id: npc_id.clone(),
            timestamp: chrono::Utc::now(),
        }));

        let mut events = match chat_service
            .process_message_stream(session_id.clone(), request.message, request.use_rag)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                yield Ok(create_sse_event("error", &ErrorInfo {
                    code: "CHAT_ERROR".to_string(),
                    message: e.to_string(),
                }));
                return;
            }
        };

        while let Some(event) = events.next().await {
            match event {
                Ok(ChatStreamEvent::Delta(delta)) => {
                    yield Ok(create_sse_event("message", &MessageChunk { delta }));
                }
                Ok(ChatStreamEvent::Completed { turn_number }) => {
                    let processing_time = start_time.elapsed().as_millis() as u64;
                    yield Ok(create_sse_event("done", &CompletionInfo {
                        session_id: session_id.clone(),
                        turn_number,
                        processing_time_ms: processing_time,
                    }));
                    info!(session_id = %session_id, processing_time, "Chat stream completed");
                }
                Err(e) => {
                    yield Ok(create_sse_event("error", &ErrorInfo {
                        code: "CHAT_STREAM_ERROR".to_string(),
                        message: e.to_string(),
                    }));
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Load the session or auto-create it against the requested NPC.
async fn ensure_session(
    state: &AppState,
    npc_id: &str,
    session_id: &str,
) -> Result<(), ApiError> {
    let persona = personas::get_persona(npc_id)?;

    match state.session_manager.load_session(session_id).await {
        Ok(_) => Ok(()),
        Err(ApiError::ConversationNotFound(_)) => {
            state
                .session_manager
                .create_session_with_id(session_id, "anonymous", persona.to_npc())
                .await?;
            info!(session_id, npc_id, "Auto-created session");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn create_sse_event<T: serde::Serialize>(event_type: &str, data: &T) -> Event {
    Event::default()
        .event(event_type)
        .data(serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string()))
}
