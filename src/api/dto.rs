//! API DTO
//!
//! 定义请求和响应数据结构，与领域模型解耦。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::ModelInfo;
use crate::pipeline::SourceRef;
use crate::tutor::stats::StatsSnapshot;

/// 问答请求
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ChatRequest {
    /// 学生消息
    pub message: String,
    /// 学科过滤（规范学科名）
    pub subject: Option<String>,
}

/// 问答响应
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// 导师回答
    pub answer: String,
    /// 引用来源
    pub sources: Vec<SourceRef>,
    /// 学生画像摘要
    pub student_profile: String,
    /// 置信度
    pub confidence: f32,
    /// 会话 ID
    pub session_id: Option<String>,
    /// 累计提问数
    pub query_count: u64,
    /// 错误说明
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 开始会话请求
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct StartSessionRequest {
    /// 指定会话 ID（缺省自动生成）
    pub session_id: Option<String>,
}

/// 会话响应
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub name: String,
    pub started_at: DateTime<Utc>,
}

/// 结束会话响应
#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    /// 被结束的会话 ID
    pub ended: Option<String>,
}

/// 课程摄取请求
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AddCurriculumRequest {
    /// 课程文件路径
    pub paths: Vec<String>,
}

/// 课程摄取响应
#[derive(Debug, Serialize)]
pub struct AddCurriculumResponse {
    /// 新索引的内容块数
    pub chunks_added: usize,
}

/// 学习建议查询参数
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SuggestionsParams {
    /// 学生提问
    pub query: String,
}

/// 学习建议响应
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    /// 命中的学科
    pub subjects: Vec<String>,
    /// 学习建议
    pub suggestions: Vec<String>,
}

/// 系统状态响应
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub is_initialized: bool,
    pub current_session: Option<String>,
    pub stats: StatsSnapshot,
    pub indexed_chunks: u64,
    pub model_info: ModelInfo,
}
