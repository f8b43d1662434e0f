use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::chunk::Subject;

/// 轮次元数据
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TurnMetadata {
    /// 学科过滤条件（如果有）
    pub subject: Option<Subject>,

    /// 引用的课程来源数量
    pub num_sources: usize,

    /// 引用的来源文件名
    pub sources: Vec<String>,
}

/// 对话轮次
///
/// 记录一问一答及其元数据，追加进有界历史窗口。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// 轮次时间戳
    pub timestamp: DateTime<Utc>,

    /// 学生问题
    pub question: String,

    /// 导师回答
    pub answer: String,

    /// 轮次元数据
    pub metadata: TurnMetadata,
}

impl ConversationTurn {
    /// 创建新轮次
    pub fn new(question: &str, answer: &str, metadata: TurnMetadata) -> Self {
        Self {
            timestamp: Utc::now(),
            question: question.to_string(),
            answer: answer.to_string(),
            metadata,
        }
    }

    /// 截断回答用于上下文拼接
    pub fn answer_preview(&self, max_chars: usize) -> String {
        if self.answer.chars().count() > max_chars {
            let truncated: String = self.answer.chars().take(max_chars).collect();
            format!("{}...", truncated)
        } else {
            self.answer.clone()
        }
    }
}
