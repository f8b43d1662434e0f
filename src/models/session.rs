use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 学习会话
///
/// 当前对话历史与画像的命名容器，仅存在于内存中。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorSession {
    /// 会话唯一标识
    pub id: String,

    /// 会话名称
    pub name: String,

    /// 会话开始时间
    pub started_at: DateTime<Utc>,
}

impl TutorSession {
    /// 创建新会话，未指定 ID 时按开始时间生成
    pub fn new(id: Option<String>) -> Self {
        let now = Utc::now();
        let id = id.unwrap_or_else(|| format!("session_{}", now.format("%Y%m%d_%H%M%S")));
        Self {
            name: id.clone(),
            id,
            started_at: now,
        }
    }
}
