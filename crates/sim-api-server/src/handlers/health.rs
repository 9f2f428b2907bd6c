use axum::extract::State;
use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::personas;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}

pub async fn service_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "llm_provider": state.settings.llm.provider.name(),
        "llm_model": state.settings.llm.model,
        "personas": personas::list_personas(),
    }))
}
