//! Hugging Face Inference API 客户端

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::llm::ChatModel;

const HF_API_BASE: &str = "https://api-inference.huggingface.co";

/// Hugging Face 托管推理客户端
pub struct HuggingFaceChatModel {
    client: reqwest::Client,
    model_name: String,
    api_token: String,
    base_url: String,
    temperature: f32,
    max_new_tokens: u32,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl HuggingFaceChatModel {
    pub fn new(
        api_token: &str,
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
            api_token: api_token.to_string(),
            base_url: HF_API_BASE.to_string(),
            temperature,
            max_new_tokens,
        })
    }

    /// 覆盖接口地址（测试用）
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ChatModel for HuggingFaceChatModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}", self.base_url, self.model_name);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({
                "inputs": prompt,
                "parameters": {
                    "temperature": self.temperature,
                    "max_new_tokens": self.max_new_tokens,
                    "top_p": 0.9,
                    "repetition_penalty": 1.05,
                    "return_full_text": false
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(crate::error::AppError::LlmBackend(format!(
                "Hugging Face generation failed: {}",
                error_text
            )));
        }

        let outputs: Vec<GeneratedText> = response.json().await?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.generated_text)
            .ok_or_else(|| {
                crate::error::AppError::LlmBackend(
                    "Hugging Face returned no generations".to_string(),
                )
            })
    }

    fn provider(&self) -> &str {
        "huggingface"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_huggingface_generate() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/mistralai/Mistral-7B-Instruct-v0.2"))
            .and(header("authorization", "Bearer hf-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "generated_text": "An equation states that two expressions are equal." }
            ])))
            .mount(&server)
            .await;

        let model = HuggingFaceChatModel::new(
            "hf-token",
            "mistralai/Mistral-7B-Instruct-v0.2",
            0.7,
            512,
            10,
        )
        .unwrap()
        .with_base_url(&server.uri());

        let answer = model.generate("What is an equation?").await.unwrap();
        assert!(answer.contains("equal"));
    }

    #[tokio::test]
    async fn test_huggingface_empty_output_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/some/repo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let model = HuggingFaceChatModel::new("hf-token", "some/repo", 0.7, 512, 10)
            .unwrap()
            .with_base_url(&server.uri());

        assert!(model.generate("hello").await.is_err());
    }
}
