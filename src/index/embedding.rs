//! 嵌入模型服务

use async_trait::async_trait;
use reqwest;
use serde::Deserialize;

use crate::config::config::EmbeddingConfig;
use crate::error::Result;

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
    fn dimension(&self) -> usize;
    fn name(&self) -> &str;
}

/// 特征哈希嵌入模型
///
/// 把分词后的 token 哈希进固定维度桶并做 L2 归一化。
/// 无外部依赖，离线可用，同一文本始终得到同一向量。
pub struct HashEmbeddingModel {
    dimension: usize,
    name: String,
}

impl HashEmbeddingModel {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            name: "hash-embedding".to_string(),
        }
    }

    fn fnv1a(bytes: &[u8]) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in bytes {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash
    }
}

#[async_trait]
impl EmbeddingModel for HashEmbeddingModel {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut sum = vec![0.0f32; self.dimension];

        for token in text.to_lowercase().split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());
            if token.is_empty() {
                continue;
            }
            let hash = Self::fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            sum[bucket] += sign;
        }

        let norm: f32 = sum.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut sum {
                *v /= norm;
            }
        }

        Ok(sum)
    }

    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let embedding = self.encode(text).await?;
            embeddings.push(embedding);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Ollama Embedding 模型客户端
pub struct OllamaEmbeddingModel {
    client: reqwest::Client,
    model_name: String,
    base_url: String,
    dimension: usize,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbeddingModel {
    pub fn new(
        base_url: &str,
        model_name: &str,
        dimension: usize,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            model_name: model_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            dimension,
        })
    }

    async fn embed(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&serde_json::json!({
                "model": self.model_name,
                "input": texts,
                "truncate": true
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(crate::error::AppError::Embedding(format!(
                "Ollama embedding failed: {}",
                error_text
            )));
        }

        let embed_response: OllamaEmbedResponse = response.json().await?;
        Ok(embed_response.embeddings)
    }
}

#[async_trait]
impl EmbeddingModel for OllamaEmbeddingModel {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed(vec![text]).await?;
        Ok(embeddings
            .into_iter()
            .next()
            .unwrap_or_else(|| vec![0.0; self.dimension]))
    }

    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        // Ollama 支持批量输入，但为了稳定性，分批处理
        let batch_size = 32;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(batch_size) {
            let chunk_vec: Vec<&str> = chunk.to_vec();
            let embeddings = self.embed(chunk_vec).await?;
            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

pub fn create_embedding_model(
    config: &EmbeddingConfig,
    dimension: usize,
) -> Result<Box<dyn EmbeddingModel>> {
    match config.backend.as_str() {
        "ollama" => {
            let model = OllamaEmbeddingModel::new(
                &config.ollama_url,
                &config.model_name,
                dimension,
                config.ollama_timeout,
            )?;
            Ok(Box::new(model))
        }
        _ => {
            let model = HashEmbeddingModel::new(dimension);
            Ok(Box::new(model))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_hash_embedding_deterministic() {
        let model = HashEmbeddingModel::new(384);

        let a = model.encode("solve linear equations").await.unwrap();
        let b = model.encode("solve linear equations").await.unwrap();

        assert_eq!(a.len(), 384);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_hash_embedding_normalized() {
        let model = HashEmbeddingModel::new(64);
        let embedding = model.encode("newton laws of motion").await.unwrap();

        let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_hash_embedding_empty_text() {
        let model = HashEmbeddingModel::new(64);
        let embedding = model.encode("").await.unwrap();
        assert_eq!(embedding, vec![0.0; 64]);
    }

    #[tokio::test]
    async fn test_batch_encoding() {
        let model = HashEmbeddingModel::new(384);
        let model: Box<dyn EmbeddingModel> = Box::new(model);

        let texts = vec!["hello", "world", "test"];
        let results = model.encode_batch(&texts).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].len(), 384);
    }

    #[tokio::test]
    async fn test_ollama_embedding_client() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2, 0.3]]
            })))
            .mount(&server)
            .await;

        let model = OllamaEmbeddingModel::new(&server.uri(), "all-minilm", 3, 10).unwrap();
        let embedding = model.encode("hello").await.unwrap();

        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_ollama_embedding_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let model = OllamaEmbeddingModel::new(&server.uri(), "all-minilm", 3, 10).unwrap();
        let result = model.encode("hello").await;

        assert!(result.is_err());
    }
}
