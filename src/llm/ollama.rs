//! Ollama 本地推理客户端

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::llm::ChatModel;

/// Ollama 生成接口客户端
pub struct OllamaChatModel {
    client: reqwest::Client,
    model_name: String,
    base_url: String,
    temperature: f32,
    max_new_tokens: u32,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaChatModel {
    pub fn new(
        base_url: &str,
        model_name: &str,
        temperature: f32,
        max_new_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            model_name: model_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature,
            max_new_tokens,
        })
    }
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&serde_json::json!({
                "model": self.model_name,
                "prompt": prompt,
                "stream": false,
                "options": {
                    "temperature": self.temperature,
                    "num_predict": self.max_new_tokens
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(crate::error::AppError::LlmBackend(format!(
                "Ollama generation failed: {}",
                error_text
            )));
        }

        let generate_response: OllamaGenerateResponse = response.json().await?;
        Ok(generate_response.response)
    }

    fn provider(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_ollama_generate() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({"model": "llama3"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Algebra is about unknowns."
            })))
            .mount(&server)
            .await;

        let model = OllamaChatModel::new(&server.uri(), "llama3", 0.7, 512, 10).unwrap();
        let answer = model.generate("What is algebra?").await.unwrap();

        assert_eq!(answer, "Algebra is about unknowns.");
        assert_eq!(model.provider(), "ollama");
    }

    #[tokio::test]
    async fn test_ollama_generate_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let model = OllamaChatModel::new(&server.uri(), "llama3", 0.7, 512, 10).unwrap();
        let result = model.generate("hello").await;

        assert!(result.is_err());
    }
}
