use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use std::path::PathBuf;

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 搜索路径：
    /// 1. ./config.toml
    /// 2. 环境变量
    pub fn load() -> Result<AppConfig, figment::Error> {
        let figment = Figment::new()
            .merge(figment::providers::Serialized::defaults(
                AppConfig::development(),
            ))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("MENTOR_").split("__").global());

        figment.extract()
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        let figment = Figment::new()
            .merge(figment::providers::Serialized::defaults(
                AppConfig::development(),
            ))
            .merge(Toml::file(path))
            .merge(Env::prefixed("MENTOR_").split("__").global());

        figment.extract()
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.store.dimension == 0 {
            return Err(ConfigValidationError::InvalidDimension);
        }

        if config.ingest.chunk_size == 0
            || config.ingest.chunk_overlap >= config.ingest.chunk_size
        {
            return Err(ConfigValidationError::InvalidChunking);
        }

        if config.memory.max_history == 0 {
            return Err(ConfigValidationError::InvalidHistoryWindow);
        }

        if config.store.top_k == 0 {
            return Err(ConfigValidationError::InvalidTopK);
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("向量维度无效，必须大于 0")]
    InvalidDimension,

    #[error("分块参数无效，chunk_overlap 必须小于 chunk_size")]
    InvalidChunking,

    #[error("记忆窗口无效，max_history 必须大于 0")]
    InvalidHistoryWindow,

    #[error("检索数量无效，top_k 必须大于 0")]
    InvalidTopK,
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

/// 检查配置文件是否存在
pub fn config_exists() -> bool {
    default_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_development_config() {
        let config = AppConfig::development();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_chunking() {
        let mut config = AppConfig::development();
        config.ingest.chunk_overlap = config.ingest.chunk_size;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidChunking)
        ));
    }

    #[test]
    fn test_validate_rejects_zero_history() {
        let mut config = AppConfig::development();
        config.memory.max_history = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidHistoryWindow)
        ));
    }
}
