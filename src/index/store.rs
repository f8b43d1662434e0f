//! 向量存储管理
//!
//! 维护课程内容块的相似度索引：创建、追加、持久化、加载与查询。
//! 查询支持按学科做后置过滤。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::index::embedding::EmbeddingModel;
use crate::models::chunk::{CurriculumChunk, Subject};

/// 带相似度得分的检索结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub score: f32,
    pub chunk: CurriculumChunk,
}

#[async_trait]
pub trait ChunkIndex: Send + Sync {
    async fn add(&self, chunk: CurriculumChunk, embedding: Vec<f32>) -> Result<()>;
    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;
    async fn count(&self) -> Result<u64>;
    async fn entries(&self) -> Result<Vec<(CurriculumChunk, Vec<f32>)>>;
}

/// 内存向量索引
pub struct MemoryChunkIndex {
    vectors: dashmap::DashMap<String, (Vec<f32>, CurriculumChunk)>,
    dimension: usize,
}

impl MemoryChunkIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: dashmap::DashMap::new(),
            dimension,
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl ChunkIndex for MemoryChunkIndex {
    async fn add(&self, chunk: CurriculumChunk, embedding: Vec<f32>) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(AppError::VectorIndex(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                embedding.len()
            )));
        }

        self.vectors.insert(chunk.id.clone(), (embedding, chunk));

        Ok(())
    }

    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dimension {
            return Err(AppError::VectorIndex(format!(
                "Query dimension mismatch: expected {}, got {}",
                self.dimension,
                query.len()
            )));
        }

        let mut results: Vec<ScoredChunk> = self
            .vectors
            .iter()
            .map(|ref_multi| {
                let (vector, chunk) = ref_multi.value();
                ScoredChunk {
                    score: Self::cosine_similarity(query, vector),
                    chunk: chunk.clone(),
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.vectors.len() as u64)
    }

    async fn entries(&self) -> Result<Vec<(CurriculumChunk, Vec<f32>)>> {
        Ok(self
            .vectors
            .iter()
            .map(|ref_multi| {
                let (vector, chunk) = ref_multi.value();
                (chunk.clone(), vector.clone())
            })
            .collect())
    }
}

/// 磁盘快照格式
#[derive(Serialize, Deserialize)]
struct StoreSnapshot {
    dimension: usize,
    embedding_model: String,
    entries: Vec<SnapshotEntry>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotEntry {
    chunk: CurriculumChunk,
    embedding: Vec<f32>,
}

/// 快照侧车元数据
#[derive(Serialize, Deserialize)]
struct StoreMetadata {
    embedding_model: String,
    num_chunks: u64,
}

const SNAPSHOT_FILE: &str = "store.json";
const METADATA_FILE: &str = "metadata.json";

/// 向量存储管理器
pub struct VectorStoreManager {
    embedding: Box<dyn EmbeddingModel>,
    index: Box<dyn ChunkIndex>,
    dimension: usize,
}

impl VectorStoreManager {
    pub fn new(embedding: Box<dyn EmbeddingModel>, index: Box<dyn ChunkIndex>) -> Self {
        let dimension = embedding.dimension();
        Self {
            embedding,
            index,
            dimension,
        }
    }

    /// 用一批内容块建立索引，空批视为错误
    pub async fn create_from_chunks(&self, chunks: Vec<CurriculumChunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Err(AppError::Validation(
                "No chunks provided for vector store creation".to_string(),
            ));
        }

        info!("Creating vector store with {} chunks", chunks.len());
        self.index_chunks(chunks).await
    }

    /// 追加内容块，空批仅告警
    pub async fn add_chunks(&self, chunks: Vec<CurriculumChunk>) -> Result<usize> {
        if chunks.is_empty() {
            warn!("No chunks to add");
            return Ok(0);
        }

        self.index_chunks(chunks).await
    }

    async fn index_chunks(&self, chunks: Vec<CurriculumChunk>) -> Result<usize> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding.encode_batch(&texts).await?;

        let added = chunks.len();
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            self.index.add(chunk, embedding).await?;
        }

        info!("Indexed {} chunks", added);
        Ok(added)
    }

    /// 相似度检索，可按学科过滤
    ///
    /// 过滤时先取 2k 个候选再做元数据等值过滤，截断到 k。
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        subject: Option<Subject>,
    ) -> Result<Vec<CurriculumChunk>> {
        let query_embedding = self.embedding.encode(query).await?;

        match subject {
            Some(subject) => {
                let candidates = self.index.search(&query_embedding, k * 2).await?;
                let mut filtered = Vec::with_capacity(k);
                for scored in candidates {
                    if scored.chunk.metadata.subject == subject {
                        filtered.push(scored.chunk);
                        if filtered.len() >= k {
                            break;
                        }
                    }
                }
                Ok(filtered)
            }
            None => {
                let results = self.index.search(&query_embedding, k).await?;
                Ok(results.into_iter().map(|s| s.chunk).collect())
            }
        }
    }

    /// 带得分的相似度检索
    pub async fn search_with_score(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedding.encode(query).await?;
        self.index.search(&query_embedding, k).await
    }

    /// 索引中的块数量
    pub async fn count(&self) -> Result<u64> {
        self.index.count().await
    }

    /// 把索引快照写到目录（snapshot + 元数据侧车）
    pub async fn save(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir).await?;

        let entries = self.index.entries().await?;
        let snapshot = StoreSnapshot {
            dimension: self.dimension,
            embedding_model: self.embedding.name().to_string(),
            entries: entries
                .into_iter()
                .map(|(chunk, embedding)| SnapshotEntry { chunk, embedding })
                .collect(),
        };

        let metadata = StoreMetadata {
            embedding_model: snapshot.embedding_model.clone(),
            num_chunks: snapshot.entries.len() as u64,
        };

        tokio::fs::write(dir.join(SNAPSHOT_FILE), serde_json::to_vec(&snapshot)?).await?;
        tokio::fs::write(
            dir.join(METADATA_FILE),
            serde_json::to_vec_pretty(&metadata)?,
        )
        .await?;

        info!("Vector store saved to {}", dir.display());
        Ok(())
    }

    /// 从目录加载快照
    ///
    /// 目录或快照缺失返回 `None`；损坏的快照告警后同样返回 `None`，
    /// 调用方据此走重建路径。
    pub async fn load(&self, dir: &Path) -> Result<Option<u64>> {
        let snapshot_path = dir.join(SNAPSHOT_FILE);
        if !snapshot_path.exists() {
            warn!("Vector store path does not exist: {}", dir.display());
            return Ok(None);
        }

        let bytes = match tokio::fs::read(&snapshot_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Error reading vector store snapshot: {}", e);
                return Ok(None);
            }
        };

        let snapshot: StoreSnapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Error parsing vector store snapshot: {}", e);
                return Ok(None);
            }
        };

        if snapshot.dimension != self.dimension {
            warn!(
                "Snapshot dimension {} does not match configured dimension {}, rebuilding",
                snapshot.dimension, self.dimension
            );
            return Ok(None);
        }

        if snapshot.embedding_model != self.embedding.name() {
            warn!(
                "Snapshot was built with embedding model '{}', current model is '{}'",
                snapshot.embedding_model,
                self.embedding.name()
            );
        }

        let loaded = snapshot.entries.len() as u64;
        for entry in snapshot.entries {
            self.index.add(entry.chunk, entry.embedding).await?;
        }

        info!("Vector store loaded from {} ({} chunks)", dir.display(), loaded);
        Ok(Some(loaded))
    }
}

/// 创建向量存储管理器
pub fn create_vector_store(embedding: Box<dyn EmbeddingModel>) -> VectorStoreManager {
    let dimension = embedding.dimension();
    VectorStoreManager::new(embedding, Box::new(MemoryChunkIndex::new(dimension)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::embedding::HashEmbeddingModel;
    use crate::models::chunk::{ChunkMetadata, FileType};

    fn chunk(text: &str, subject: Subject) -> CurriculumChunk {
        CurriculumChunk::new(
            text,
            ChunkMetadata {
                source_file: "test.txt".to_string(),
                subject,
                topic: None,
                file_type: FileType::Txt,
            },
        )
    }

    fn store() -> VectorStoreManager {
        create_vector_store(Box::new(HashEmbeddingModel::new(64)))
    }

    #[tokio::test]
    async fn test_create_rejects_empty_batch() {
        let store = store();
        let result = store.create_from_chunks(vec![]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_empty_batch_is_noop() {
        let store = store();
        let added = store.add_chunks(vec![]).await.unwrap();
        assert_eq!(added, 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_ranks_relevant_chunk_first() {
        let store = store();
        store
            .create_from_chunks(vec![
                chunk("algebra equations and variables", Subject::Mathematics),
                chunk("newton laws of motion and force", Subject::Science),
                chunk("reading comprehension strategies", Subject::English),
            ])
            .await
            .unwrap();

        let results = store.search("algebra equations", 2, None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].text.contains("algebra"));
    }

    #[tokio::test]
    async fn test_subject_filter_post_filters() {
        let store = store();
        store
            .create_from_chunks(vec![
                chunk("motion force energy", Subject::Science),
                chunk("motion in algebra word problems", Subject::Mathematics),
            ])
            .await
            .unwrap();

        let results = store
            .search("motion", 4, Some(Subject::Science))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.subject, Subject::Science);
    }

    #[tokio::test]
    async fn test_search_with_score_orders_descending() {
        let store = store();
        store
            .create_from_chunks(vec![
                chunk("algebra equations and variables", Subject::Mathematics),
                chunk("newton laws of motion", Subject::Science),
            ])
            .await
            .unwrap();

        let results = store
            .search_with_score("algebra equations", 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert!(results[0].chunk.text.contains("algebra"));
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let store = store();
        store
            .create_from_chunks(vec![
                chunk("algebra equations", Subject::Mathematics),
                chunk("newton laws", Subject::Science),
            ])
            .await
            .unwrap();
        store.save(dir.path()).await.unwrap();

        let restored = self::store();
        let loaded = restored.load(dir.path()).await.unwrap();
        assert_eq!(loaded, Some(2));

        let results = restored.search("algebra", 1, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].text.contains("algebra"));
    }

    #[tokio::test]
    async fn test_load_missing_path_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store();
        let loaded = store.load(&dir.path().join("nope")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_snapshot_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SNAPSHOT_FILE), b"not json").unwrap();

        let store = store();
        let loaded = store.load(dir.path()).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let index = MemoryChunkIndex::new(8);
        let result = index
            .add(chunk("text", Subject::General), vec![0.0; 4])
            .await;
        assert!(matches!(result, Err(AppError::VectorIndex(_))));
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let c = vec![0.0, 1.0, 0.0];

        assert_eq!(MemoryChunkIndex::cosine_similarity(&a, &b), 1.0);
        assert_eq!(MemoryChunkIndex::cosine_similarity(&a, &c), 0.0);
    }
}
