//! 语言模型模块
//!
//! 统一的 ChatModel 抽象和多后端选择：托管推理（Hugging Face）、
//! 本地推理（Ollama）、托管对话模型（Gemini）以及确定性回退。
//! 按可用凭据选择后端，任何初始化失败都降级到回退模型。

pub mod gemini;
pub mod huggingface;
pub mod ollama;
pub mod prompt;

pub use gemini::GeminiChatModel;
pub use huggingface::HuggingFaceChatModel;
pub use ollama::OllamaChatModel;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::config::LlmConfig;
use crate::error::Result;

/// 语言模型抽象
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// 根据提示词生成回复
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// 后端名称
    fn provider(&self) -> &str;

    /// 模型名称
    fn model_name(&self) -> &str;
}

/// 模型信息（状态接口用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub provider: String,
}

impl ModelInfo {
    pub fn of(model: &dyn ChatModel) -> Self {
        Self {
            model_name: model.model_name().to_string(),
            provider: model.provider().to_string(),
        }
    }
}

/// 确定性回退模型
///
/// 无任何可用后端时循环返回固定回复列表。
pub struct ScriptedChatModel {
    responses: Vec<String>,
    cursor: Mutex<usize>,
}

impl ScriptedChatModel {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            cursor: Mutex::new(0),
        }
    }

    pub fn with_default_responses() -> Self {
        Self::new(
            [
                "I understand you're asking about that topic. Let me help you learn step by step.",
                "That's a great question! Let me break it down for you.",
                "I can see you're working on this concept. Here's how I'd explain it:",
                "Let's explore this together. What specific part would you like to focus on?",
                "That's an interesting point. Let me provide some guidance on this.",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        let mut cursor = self.cursor.lock();
        let response = self.responses[*cursor % self.responses.len()].clone();
        *cursor = (*cursor + 1) % self.responses.len();
        Ok(response)
    }

    fn provider(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-fallback"
    }
}

/// 按配置与可用凭据选择语言模型后端
///
/// `auto` 的优先级沿用：有 Hugging Face 令牌且模型名看起来是
/// hub 仓库时优先托管推理；其次是带密钥的 Gemini；否则回退模型。
/// 后端构造失败一律降级到回退模型。
pub fn create_chat_model(config: &LlmConfig) -> Box<dyn ChatModel> {
    let selected: Result<Box<dyn ChatModel>> = match config.backend.as_str() {
        "huggingface" => build_huggingface(config),
        "gemini" => build_gemini(config),
        "ollama" => build_ollama(config),
        "scripted" => Ok(Box::new(ScriptedChatModel::with_default_responses())),
        _ => {
            let model_lower = config.model_name.to_lowercase();
            if !config.huggingface_api_token.is_empty()
                && (config.model_name.contains('/') || model_lower.contains("mistral"))
            {
                build_huggingface(config)
            } else if !config.gemini_api_key.is_empty() && model_lower.contains("gemini") {
                build_gemini(config)
            } else {
                Ok(Box::new(ScriptedChatModel::with_default_responses()))
            }
        }
    };

    match selected {
        Ok(model) => {
            info!(
                "Chat model initialized: {} (provider: {})",
                model.model_name(),
                model.provider()
            );
            model
        }
        Err(e) => {
            warn!("Error initializing chat model, falling back: {}", e);
            Box::new(ScriptedChatModel::with_default_responses())
        }
    }
}

fn build_huggingface(config: &LlmConfig) -> Result<Box<dyn ChatModel>> {
    let model = HuggingFaceChatModel::new(
        &config.huggingface_api_token,
        &config.model_name,
        config.temperature,
        config.max_new_tokens,
        config.request_timeout,
    )?;
    Ok(Box::new(model))
}

fn build_gemini(config: &LlmConfig) -> Result<Box<dyn ChatModel>> {
    let model = GeminiChatModel::new(
        &config.gemini_api_key,
        &config.model_name,
        config.temperature,
        config.max_new_tokens,
        config.request_timeout,
    )?;
    Ok(Box::new(model))
}

fn build_ollama(config: &LlmConfig) -> Result<Box<dyn ChatModel>> {
    let model = OllamaChatModel::new(
        &config.ollama_url,
        &config.model_name,
        config.temperature,
        config.max_new_tokens,
        config.request_timeout,
    )?;
    Ok(Box::new(model))
}
