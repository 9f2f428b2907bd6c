use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use sim_api_server::config::Settings;
use sim_api_server::handlers;
use sim_api_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sim_api_server=debug".to_string()),
        )
        .with_target(true)
        .json()
        .init();

    info!("Starting simulation API server...");

    let settings = Settings::load()?;
    info!("Configuration loaded");

    let state = AppState::initialize(settings.clone()).await?;

    let app = build_router(state.clone());

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route("/info", get(handlers::health::service_info));

    let api_routes = Router::new()
        .route("/api/npc/{npc_id}/chat", post(handlers::chat::chat_handler))
        .route(
            "/api/npc/{npc_id}/chat/stream",
            post(handlers::chat::chat_stream_handler),
        )
        .route("/api/sessions", post(handlers::sessions::create_session))
        .route(
            "/api/sessions/{session_id}/end",
            post(handlers::sessions::end_session),
        )
        .route(
            "/api/sessions/{session_id}",
            delete(handlers::sessions::reset_session),
        )
        .route(
            "/api/sessions/{session_id}/analyze",
            post(handlers::sessions::analyze_session),
        )
        .route(
            "/api/sessions/{session_id}/evaluate",
            post(handlers::sessions::evaluate_session),
        )
        .route(
            "/api/users/{user_id}/sessions",
            get(handlers::sessions::list_sessions)
                .delete(handlers::sessions::reset_all_user_sessions),
        )
        .route("/api/ingest", post(handlers::rag::ingest_handler))
        .route("/api/retrieve", post(handlers::rag::retrieve_handler))
        .route("/api/tools", get(handlers::tools::list_tools))
        .route("/api/tools/{tool_name}", post(handlers::tools::execute_tool));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}
