pub mod retriever;
pub mod vector_store;

pub use retriever::{EmbeddingProvider, Retriever, ScoredPoint, VectorIndex};
pub use vector_store::QdrantVectorStore;
