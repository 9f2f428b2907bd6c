use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Settings;
use crate::database::{ConversationRepository, DbPool};
use crate::memory::{CompositeMemoryStore, ConversationStore, RedisMemoryStore};
use crate::services::chat_service::{ContextRetriever, LlmProvider};
use crate::services::provider::{create_embedding_service, create_llm_service};
use crate::services::rag::{QdrantVectorStore, Retriever};
use crate::services::{
    ChatService, DirectorService, EvaluationService, IngestService, ResetService, SessionManager,
};

/// The application's dependency graph, wired once at startup and torn down
/// once at shutdown. Handlers receive a clone; everything inside is shared.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub memory: Arc<dyn ConversationStore>,
    pub session_manager: Arc<SessionManager>,
    pub chat_service: Arc<ChatService>,
    pub retriever: Arc<dyn ContextRetriever>,
    pub ingest_service: Arc<IngestService>,
    pub director_service: Arc<DirectorService>,
    pub evaluation_service: Arc<EvaluationService>,
    pub reset_service: Arc<ResetService>,
}

impl AppState {
    pub async fn initialize(settings: Settings) -> Result<Self> {
        // Cache tier (Redis).
        let redis_store = Arc::new(
            RedisMemoryStore::new(&settings.redis.url, settings.redis.session_ttl_seconds)
                .context("failed to configure Redis store")?,
        );

        // Durable tier (PostgreSQL).
        let db_pool = DbPool::new(&settings.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        let repository = Arc::new(ConversationRepository::new(db_pool));
        repository
            .ensure_tables()
            .await
            .context("failed to ensure conversation tables")?;
        info!("Database connection established");

        // Composite memory over both tiers.
        let memory: Arc<dyn ConversationStore> =
            Arc::new(CompositeMemoryStore::new(redis_store, repository));

        let session_manager = Arc::new(SessionManager::new(memory.clone()));

        // Model backends.
        let llm: Arc<dyn LlmProvider> = Arc::new(create_llm_service(&settings.llm));
        let embedding = Arc::new(create_embedding_service(&settings.embedding));

        // Vector index sized to the embedding dimensionality.
        let vector_store = Arc::new(QdrantVectorStore::new(
            &settings.qdrant,
            settings.embedding.dimension,
        ));
        let retriever: Arc<dyn ContextRetriever> =
            Arc::new(Retriever::new(embedding, vector_store));

        let chat_service = Arc::new(ChatService::new(
            session_manager.clone(),
            llm.clone(),
            Some(retriever.clone()),
            settings.llm.max_context_tokens,
        ));
        let ingest_service = Arc::new(IngestService::new(
            retriever.clone(),
            settings.rag.chunk_size,
            settings.rag.chunk_overlap,
        ));
        let director_service = Arc::new(DirectorService::new(llm.clone()));
        let evaluation_service = Arc::new(EvaluationService::new(llm));
        let reset_service = Arc::new(ResetService::new(session_manager.clone()));

        info!("Application state initialized");

        Ok(Self {
            settings,
            memory,
            session_manager,
            chat_service,
            retriever,
            ingest_service,
            director_service,
            evaluation_service,
            reset_service,
        })
    }

    pub async fn shutdown(&self) {
        if let Err(e) = self.memory.close().await {
            tracing::error!(error = %e, "Error closing memory stores");
        }
        info!("Application state shut down");
    }
}
