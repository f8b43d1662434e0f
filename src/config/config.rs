use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 请求超时（秒）
    pub request_timeout: u64,
    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件路径
    pub log_dir: Option<PathBuf>,
}

/// 嵌入模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// 模型名称
    pub model_name: String,
    /// Embedding 后端类型: "ollama" 或 "hash"
    pub backend: String,
    /// 批处理大小
    pub batch_size: usize,
    /// Ollama 服务器地址
    pub ollama_url: String,
    /// Ollama 请求超时（秒）
    pub ollama_timeout: u64,
}

/// 语言模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// 模型名称
    pub model_name: String,
    /// 后端类型: "auto"、"huggingface"、"gemini"、"ollama" 或 "scripted"
    pub backend: String,
    /// Gemini API 密钥
    pub gemini_api_key: String,
    /// Hugging Face API 令牌
    pub huggingface_api_token: String,
    /// Ollama 服务器地址
    pub ollama_url: String,
    /// 采样温度
    pub temperature: f32,
    /// 最大生成 Token 数
    pub max_new_tokens: u32,
    /// 请求超时（秒）
    pub request_timeout: u64,
}

/// 向量存储配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// 快照数据目录
    pub data_dir: PathBuf,
    /// 向量维度
    pub dimension: usize,
    /// 默认检索数量
    pub top_k: usize,
}

/// 课程摄取配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IngestConfig {
    /// 课程文档目录
    pub curriculum_dir: PathBuf,
    /// 分块大小（字符）
    pub chunk_size: usize,
    /// 分块重叠（字符）
    pub chunk_overlap: usize,
}

/// 对话记忆配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MemoryConfig {
    /// 记忆窗口大小（轮次）
    pub max_history: usize,
}

/// 安全配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// API 密钥（为空时禁用认证）
    pub api_key: String,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 嵌入模型配置
    pub embedding: EmbeddingConfig,
    /// 语言模型配置
    pub llm: LlmConfig,
    /// 向量存储配置
    pub store: StoreConfig,
    /// 课程摄取配置
    pub ingest: IngestConfig,
    /// 对话记忆配置
    pub memory: MemoryConfig,
    /// 安全配置
    pub security: SecurityConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8080,
                request_timeout: 30,
                max_request_size: 10 * 1024 * 1024,
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: true,
                log_dir: Some(PathBuf::from("./logs")),
            },
            embedding: EmbeddingConfig {
                model_name: "all-MiniLM-L6-v2".into(),
                backend: "hash".into(),
                batch_size: 32,
                ollama_url: "http://localhost:11434".into(),
                ollama_timeout: 60,
            },
            llm: LlmConfig {
                model_name: "gemini-1.5-flash".into(),
                backend: "auto".into(),
                gemini_api_key: String::new(),
                huggingface_api_token: String::new(),
                ollama_url: "http://localhost:11434".into(),
                temperature: 0.7,
                max_new_tokens: 512,
                request_timeout: 60,
            },
            store: StoreConfig {
                data_dir: PathBuf::from("./data/vector_store"),
                dimension: 384,
                top_k: 4,
            },
            ingest: IngestConfig {
                curriculum_dir: PathBuf::from("./curriculum_data"),
                chunk_size: 1000,
                chunk_overlap: 200,
            },
            memory: MemoryConfig { max_history: 10 },
            security: SecurityConfig {
                api_key: String::new(),
            },
            app_name: "mentor".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.ingest.chunk_size, 1000);
        assert_eq!(config.ingest.chunk_overlap, 200);
        assert_eq!(config.memory.max_history, 10);
        assert_eq!(config.store.top_k, 4);
        assert_eq!(config.store.dimension, 384);
    }

    #[test]
    fn test_production_overrides() {
        let config = AppConfig::production();
        assert_eq!(config.environment, "production");
        assert_eq!(config.logging.level, "info");
    }
}
