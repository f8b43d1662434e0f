use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 学科分类
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Subject {
    /// 数学
    #[serde(rename = "mathematics")]
    Mathematics,
    /// 科学
    #[serde(rename = "science")]
    Science,
    /// 历史
    #[serde(rename = "history")]
    History,
    /// 英语
    #[serde(rename = "english")]
    English,
    /// 计算机
    #[serde(rename = "computer")]
    Computer,
    /// 通用
    #[serde(rename = "general")]
    General,
}

impl Subject {
    /// 学科的规范名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Mathematics => "mathematics",
            Subject::Science => "science",
            Subject::History => "history",
            Subject::English => "english",
            Subject::Computer => "computer",
            Subject::General => "general",
        }
    }

    /// 从规范名称解析学科
    pub fn parse(value: &str) -> Option<Subject> {
        match value.to_lowercase().as_str() {
            "mathematics" | "math" => Some(Subject::Mathematics),
            "science" => Some(Subject::Science),
            "history" => Some(Subject::History),
            "english" => Some(Subject::English),
            "computer" => Some(Subject::Computer),
            "general" => Some(Subject::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Subject {
    fn default() -> Self {
        Subject::General
    }
}

/// 文件类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileType {
    /// PDF 文档
    #[serde(rename = "pdf")]
    Pdf,
    /// 纯文本
    #[serde(rename = "txt")]
    Txt,
    /// 内置示例内容
    #[serde(rename = "generated")]
    Generated,
}

impl Default for FileType {
    fn default() -> Self {
        FileType::Txt
    }
}

/// 块元数据
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChunkMetadata {
    /// 来源文件名
    pub source_file: String,
    /// 学科
    pub subject: Subject,
    /// 主题
    pub topic: Option<String>,
    /// 文件类型
    pub file_type: FileType,
}

/// 课程内容块
///
/// 摄取时一次性生成，之后不可变，由向量存储持有。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumChunk {
    /// 块唯一标识
    pub id: String,

    /// 文本内容
    pub text: String,

    /// 块元数据
    pub metadata: ChunkMetadata,
}

impl CurriculumChunk {
    /// 创建新内容块
    pub fn new(text: &str, metadata: ChunkMetadata) -> Self {
        Self {
            id: format!("chunk_{}", Uuid::new_v4()),
            text: text.to_string(),
            metadata,
        }
    }

    /// 截断预览（超长时追加省略号）
    pub fn preview(&self, max_chars: usize) -> String {
        if self.text.chars().count() > max_chars {
            let truncated: String = self.text.chars().take(max_chars).collect();
            format!("{}...", truncated)
        } else {
            self.text.clone()
        }
    }

    /// 获取内容长度
    pub fn content_length(&self) -> usize {
        self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_create() {
        let chunk = CurriculumChunk::new(
            "Algebra uses symbols to represent numbers.",
            ChunkMetadata {
                source_file: "algebra_basics.txt".to_string(),
                subject: Subject::Mathematics,
                topic: Some("algebra_basics".to_string()),
                file_type: FileType::Txt,
            },
        );

        assert!(chunk.id.starts_with("chunk_"));
        assert_eq!(chunk.metadata.subject, Subject::Mathematics);
    }

    #[test]
    fn test_preview_truncation() {
        let chunk = CurriculumChunk::new(&"a".repeat(300), ChunkMetadata::default());
        let preview = chunk.preview(200);
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));

        let short = CurriculumChunk::new("short text", ChunkMetadata::default());
        assert_eq!(short.preview(200), "short text");
    }

    #[test]
    fn test_subject_parse() {
        assert_eq!(Subject::parse("math"), Some(Subject::Mathematics));
        assert_eq!(Subject::parse("Mathematics"), Some(Subject::Mathematics));
        assert_eq!(Subject::parse("basket weaving"), None);
    }
}
