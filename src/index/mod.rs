//! 索引模块

pub mod embedding;
pub mod store;

pub use embedding::{EmbeddingModel, HashEmbeddingModel, OllamaEmbeddingModel, create_embedding_model};
pub use store::{ChunkIndex, MemoryChunkIndex, ScoredChunk, VectorStoreManager, create_vector_store};
