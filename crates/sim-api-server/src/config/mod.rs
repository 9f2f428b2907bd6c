pub mod settings;

pub use settings::{
    DatabaseConfig, EmbeddingConfig, LlmConfig, QdrantConfig, RagConfig, RedisConfig,
    ServerConfig, Settings,
};
