//! Google Gemini 客户端

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::llm::ChatModel;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini generateContent 接口客户端
pub struct GeminiChatModel {
    client: reqwest::Client,
    model_name: String,
    api_key: String,
    base_url: String,
    temperature: f32,
    max_new_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

impl GeminiChatModel {
    pub fn new(
        api_key: &str,
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
            api_key: api_key.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
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
impl ChatModel for GeminiChatModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&serde_json::json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "maxOutputTokens": self.max_new_tokens
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(crate::error::AppError::LlmBackend(format!(
                "Gemini generation failed: {}",
                error_text
            )));
        }

        let content_response: GenerateContentResponse = response.json().await?;
        let text = content_response
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(crate::error::AppError::LlmBackend(
                "Gemini returned no candidates".to_string(),
            ));
        }

        Ok(text)
    }

    fn provider(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
