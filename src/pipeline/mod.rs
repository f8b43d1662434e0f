//! RAG 查询管道
//!
//! 把检索、记忆和语言模型组合成单次查询调用：
//! 检索课程内容 → 拼接个性化提示词 → 生成并规整回答 → 写回记忆。
//! 每一级都有回退：检索失败跳过检索直接生成，生成再失败返回固定致歉。

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use parking_lot::RwLock;
use tracing::{error, info};

use crate::index::store::VectorStoreManager;
use crate::llm::{ChatModel, prompt};
use crate::memory::ConversationMemory;
use crate::models::chunk::{CurriculumChunk, FileType, Subject};
use crate::models::turn::TurnMetadata;

/// 来源预览长度（字符）
const SOURCE_PREVIEW_CHARS: usize = 200;

/// 无来源时的保底置信度
const NO_SOURCE_CONFIDENCE: f32 = 0.3;

/// 查询学科关键词表（与文件名表有意不同：面向口语化提问）
const QUERY_SUBJECT_KEYWORDS: &[(Subject, &[&str])] = &[
    (
        Subject::Mathematics,
        &["math", "algebra", "geometry", "calculus", "equation", "solve", "calculate"],
    ),
    (
        Subject::Science,
        &["science", "physics", "chemistry", "biology", "experiment", "theory"],
    ),
    (
        Subject::English,
        &["english", "literature", "writing", "grammar", "essay", "reading"],
    ),
    (
        Subject::History,
        &["history", "historical", "past", "ancient", "war", "civilization"],
    ),
    (
        Subject::Computer,
        &["computer", "programming", "code", "algorithm", "software"],
    ),
];

/// 格式化后的引用来源
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// 序号（从 1 开始）
    pub id: usize,
    /// 内容预览
    pub content: String,
    /// 来源文件
    pub source_file: String,
    /// 学科
    pub subject: Subject,
    /// 主题
    pub topic: Option<String>,
}

/// 一次查询的完整结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorReply {
    /// 导师回答
    pub answer: String,
    /// 引用的课程来源
    pub sources: Vec<SourceRef>,
    /// 学生画像摘要
    pub student_profile: String,
    /// 置信度 (0.0-1.0)
    pub confidence: f32,
}

/// RAG 管道
pub struct RagPipeline {
    store: Arc<VectorStoreManager>,
    chat_model: Arc<dyn ChatModel>,
    memory: Arc<RwLock<ConversationMemory>>,
    top_k: usize,
}

impl RagPipeline {
    /// 创建管道
    pub fn new(
        store: Arc<VectorStoreManager>,
        chat_model: Arc<dyn ChatModel>,
        memory: Arc<RwLock<ConversationMemory>>,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            chat_model,
            memory,
            top_k,
        }
    }

    /// 处理一个学生问题
    ///
    /// 该调用不会失败：检索或生成出错时逐级降级。
    pub async fn query(&self, question: &str, subject_filter: Option<Subject>) -> TutorReply {
        let student_context = self.memory.read().personalized_context();

        match self
            .retrieve_and_generate(question, subject_filter, &student_context)
            .await
        {
            Ok((answer, sources)) => {
                let metadata = TurnMetadata {
                    subject: subject_filter,
                    num_sources: sources.len(),
                    sources: sources
                        .iter()
                        .map(|c| c.metadata.source_file.clone())
                        .collect(),
                };
                self.memory.write().record(question, &answer, metadata);

                let confidence = confidence_score(&sources);
                let reply = TutorReply {
                    answer,
                    sources: format_sources(&sources),
                    student_profile: self.memory.read().profile_summary(),
                    confidence,
                };

                info!("Processed query successfully with {} sources", reply.sources.len());
                reply
            }
            Err(e) => {
                error!("Error processing query: {}", e);
                self.fallback_reply(question).await
            }
        }
    }

    async fn retrieve_and_generate(
        &self,
        question: &str,
        subject_filter: Option<Subject>,
        student_context: &str,
    ) -> crate::error::Result<(String, Vec<CurriculumChunk>)> {
        let chunks = self
            .store
            .search(question, self.top_k, subject_filter)
            .await?;

        let context = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let formatted = prompt::rag_prompt(&context, student_context, question);
        let raw = self.chat_model.generate(&formatted).await?;
        let answer = prompt::clean_response(&raw, &formatted);

        Ok((answer, chunks))
    }

    /// 跳过检索的回退路径，仅带最近对话上下文
    async fn fallback_reply(&self, question: &str) -> TutorReply {
        let chat_history = self.memory.read().recent_context();
        let formatted = prompt::fallback_prompt(&chat_history, question);

        let (answer, confidence) = match self.chat_model.generate(&formatted).await {
            Ok(raw) => (
                prompt::clean_response(&raw, &formatted),
                NO_SOURCE_CONFIDENCE,
            ),
            Err(e) => {
                error!("Fallback generation failed: {}", e);
                (prompt::PIPELINE_APOLOGY.to_string(), 0.0)
            }
        };

        TutorReply {
            answer,
            sources: Vec::new(),
            student_profile: self.memory.read().profile_summary(),
            confidence,
        }
    }

    /// 根据提问猜测相关学科
    pub fn suggest_subjects(&self, query: &str) -> Vec<Subject> {
        suggest_subjects(query)
    }
}

/// 根据提问猜测相关学科，没有命中时归入通用
pub fn suggest_subjects(query: &str) -> Vec<Subject> {
    let query = query.to_lowercase();
    let mut subjects = Vec::new();

    for (subject, keywords) in QUERY_SUBJECT_KEYWORDS {
        if keywords.iter().any(|k| query.contains(k)) {
            subjects.push(*subject);
        }
    }

    if subjects.is_empty() {
        subjects.push(Subject::General);
    }
    subjects
}

/// 置信度启发式
///
/// 无来源 0.3；否则 min(0.9, 0.5 + 0.1 * 来源数)，
/// PDF 来源与非通用学科来源各加 0.05，上限 1.0。
fn confidence_score(sources: &[CurriculumChunk]) -> f32 {
    if sources.is_empty() {
        return NO_SOURCE_CONFIDENCE;
    }

    let base = (0.5 + sources.len() as f32 * 0.1).min(0.9);

    let mut bonus = 0.0;
    for chunk in sources {
        if chunk.metadata.file_type == FileType::Pdf {
            bonus += 0.05;
        }
        if chunk.metadata.subject != Subject::General {
            bonus += 0.05;
        }
    }

    (base + bonus).min(1.0)
}

fn format_sources(sources: &[CurriculumChunk]) -> Vec<SourceRef> {
    sources
        .iter()
        .enumerate()
        .map(|(i, chunk)| SourceRef {
            id: i + 1,
            content: chunk.preview(SOURCE_PREVIEW_CHARS),
            source_file: chunk.metadata.source_file.clone(),
            subject: chunk.metadata.subject,
            topic: chunk.metadata.topic.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::index::embedding::HashEmbeddingModel;
    use crate::index::store::{MemoryChunkIndex, create_vector_store};
    use crate::llm::ScriptedChatModel;
    use crate::models::chunk::ChunkMetadata;
    use async_trait::async_trait;
    use mockall::mock;
    use rstest::rstest;

    mock! {
        pub Chat {}

        #[async_trait]
        impl ChatModel for Chat {
            async fn generate(&self, prompt: &str) -> Result<String>;
            fn provider(&self) -> &str;
            fn model_name(&self) -> &str;
        }
    }

    fn chunk(text: &str, subject: Subject, file_type: FileType) -> CurriculumChunk {
        CurriculumChunk::new(
            text,
            ChunkMetadata {
                source_file: "sample_curriculum".to_string(),
                subject,
                topic: Some("unit_1".to_string()),
                file_type,
            },
        )
    }

    async fn pipeline_with_chunks(chunks: Vec<CurriculumChunk>) -> RagPipeline {
        let store = create_vector_store(Box::new(HashEmbeddingModel::new(64)));
        if !chunks.is_empty() {
            store.create_from_chunks(chunks).await.unwrap();
        }

        RagPipeline::new(
            Arc::new(store),
            Arc::new(ScriptedChatModel::with_default_responses()),
            Arc::new(RwLock::new(ConversationMemory::new(10))),
            4,
        )
    }

    #[tokio::test]
    async fn test_query_returns_sources_and_confidence() {
        let pipeline = pipeline_with_chunks(vec![
            chunk("algebra equations and variables", Subject::Mathematics, FileType::Txt),
            chunk("newton laws of motion", Subject::Science, FileType::Txt),
        ])
        .await;

        let reply = pipeline.query("how do algebra equations work", None).await;

        assert!(!reply.answer.is_empty());
        assert!(!reply.sources.is_empty());
        assert_eq!(reply.sources[0].id, 1);
        assert!(reply.confidence > NO_SOURCE_CONFIDENCE);
        assert!(reply.student_profile.contains("Sessions completed: 1"));
    }

    #[tokio::test]
    async fn test_query_records_turn_in_memory() {
        let pipeline = pipeline_with_chunks(vec![chunk(
            "algebra equations",
            Subject::Mathematics,
            FileType::Txt,
        )])
        .await;

        pipeline
            .query("explain equations", Some(Subject::Mathematics))
            .await;

        let memory = pipeline.memory.read();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.history()[0].metadata.subject, Some(Subject::Mathematics));
        assert!(memory.history()[0].metadata.num_sources > 0);
    }

    #[tokio::test]
    async fn test_retrieval_failure_falls_back_without_sources() {
        // 嵌入维度与索引维度不一致，检索必然报错
        let store = crate::index::store::VectorStoreManager::new(
            Box::new(HashEmbeddingModel::new(8)),
            Box::new(MemoryChunkIndex::new(16)),
        );
        let pipeline = RagPipeline::new(
            Arc::new(store),
            Arc::new(ScriptedChatModel::with_default_responses()),
            Arc::new(RwLock::new(ConversationMemory::new(10))),
            4,
        );

        let reply = pipeline.query("anything", None).await;

        assert!(reply.sources.is_empty());
        assert_eq!(reply.confidence, NO_SOURCE_CONFIDENCE);
        assert!(!reply.answer.is_empty());
    }

    #[tokio::test]
    async fn test_total_failure_returns_apology() {
        let mut chat = MockChat::new();
        chat.expect_generate()
            .returning(|_| Err(AppError::LlmBackend("backend down".to_string())));
        chat.expect_provider().return_const("mock".to_string());
        chat.expect_model_name().return_const("mock-model".to_string());

        let store = crate::index::store::VectorStoreManager::new(
            Box::new(HashEmbeddingModel::new(8)),
            Box::new(MemoryChunkIndex::new(16)),
        );
        let pipeline = RagPipeline::new(
            Arc::new(store),
            Arc::new(chat),
            Arc::new(RwLock::new(ConversationMemory::new(10))),
            4,
        );

        let reply = pipeline.query("anything", None).await;

        assert_eq!(reply.answer, prompt::PIPELINE_APOLOGY);
        assert_eq!(reply.confidence, 0.0);
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_confidence_no_sources() {
        assert_eq!(confidence_score(&[]), NO_SOURCE_CONFIDENCE);
    }

    #[test]
    fn test_confidence_scales_with_sources() {
        let two = vec![
            chunk("a", Subject::General, FileType::Txt),
            chunk("b", Subject::General, FileType::Txt),
        ];
        assert!((confidence_score(&two) - 0.7).abs() < 1e-6);

        let pdf_sources = vec![chunk("a", Subject::Mathematics, FileType::Pdf)];
        // 0.6 基础分 + 0.05 PDF + 0.05 非通用学科
        assert!((confidence_score(&pdf_sources) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_capped_at_one() {
        let many: Vec<CurriculumChunk> = (0..10)
            .map(|_| chunk("a", Subject::Mathematics, FileType::Pdf))
            .collect();
        assert!(confidence_score(&many) <= 1.0);
    }

    #[rstest]
    #[case("how do I solve this equation", vec![Subject::Mathematics])]
    #[case("tell me about ancient civilizations", vec![Subject::History])]
    #[case("physics experiment with code", vec![Subject::Science, Subject::Computer])]
    #[case("hello there", vec![Subject::General])]
    fn test_suggest_subjects(#[case] query: &str, #[case] expected: Vec<Subject>) {
        assert_eq!(suggest_subjects(query), expected);
    }
}
