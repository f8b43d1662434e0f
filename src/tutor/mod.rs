//! 导师系统门面
//!
//! 把文档处理、向量存储、对话记忆、语言模型和 RAG 管道装配成
//! 一个服务对象：负责启动引导、会话生命周期、问答入口和使用统计。

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

use crate::config::config::AppConfig;
use crate::error::{AppError, Result};
use crate::index::embedding::create_embedding_model;
use crate::index::store::{VectorStoreManager, create_vector_store};
use crate::llm::{ChatModel, ModelInfo, create_chat_model};
use crate::memory::ConversationMemory;
use crate::models::chunk::Subject;
use crate::models::session::TutorSession;
use crate::pipeline::{RagPipeline, SourceRef};
use crate::tutor::stats::{StatsSnapshot, SystemStats};

pub mod stats;

/// 系统未初始化时的固定回复
const NOT_INITIALIZED_REPLY: &str = "I'm sorry, but the AI tutor system is not properly \
     initialized. Please try again later.";

/// 导师系统的对外回复
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorResponse {
    /// 导师回答
    pub answer: String,
    /// 引用的课程来源
    pub sources: Vec<SourceRef>,
    /// 学生画像摘要
    pub student_profile: String,
    /// 置信度
    pub confidence: f32,
    /// 所属会话
    pub session_id: Option<String>,
    /// 累计提问数
    pub query_count: u64,
    /// 错误说明（正常应答时为空）
    pub error: Option<String>,
}

/// 系统状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    /// 是否完成初始化
    pub is_initialized: bool,
    /// 当前会话
    pub current_session: Option<String>,
    /// 使用统计
    pub stats: StatsSnapshot,
    /// 已索引的内容块数
    pub indexed_chunks: u64,
    /// 语言模型信息
    pub model_info: ModelInfo,
}

/// 导师系统
pub struct TutorSystem {
    config: AppConfig,
    processor: crate::ingest::DocumentProcessor,
    store: Arc<VectorStoreManager>,
    memory: Arc<RwLock<ConversationMemory>>,
    chat_model: Arc<dyn ChatModel>,
    pipeline: RagPipeline,
    current_session: RwLock<Option<TutorSession>>,
    stats: SystemStats,
    initialized: AtomicBool,
}

impl TutorSystem {
    /// 装配各组件（不做磁盘引导，见 [`TutorSystem::initialize`]）
    pub fn new(config: AppConfig) -> Result<Self> {
        let processor = crate::ingest::DocumentProcessor::new(
            config.ingest.chunk_size,
            config.ingest.chunk_overlap,
        );
        info!("Document processor initialized");

        let embedding = create_embedding_model(&config.embedding, config.store.dimension)?;
        info!(
            "Embedding model initialized: {} (backend: {})",
            config.embedding.model_name, config.embedding.backend
        );

        let store = Arc::new(create_vector_store(embedding));
        info!("Vector store manager initialized");

        let memory = Arc::new(RwLock::new(ConversationMemory::new(config.memory.max_history)));
        info!("Conversation memory initialized");

        let chat_model: Arc<dyn ChatModel> = Arc::from(create_chat_model(&config.llm));

        let pipeline = RagPipeline::new(
            store.clone(),
            chat_model.clone(),
            memory.clone(),
            config.store.top_k,
        );
        info!("RAG pipeline initialized");

        Ok(Self {
            config,
            processor,
            store,
            memory,
            chat_model,
            pipeline,
            current_session: RwLock::new(None),
            stats: SystemStats::default(),
            initialized: AtomicBool::new(false),
        })
    }

    /// 引导向量存储：优先加载快照，否则摄取课程目录，
    /// 再不行用内置示例课程兜底，建好后落盘。
    pub async fn initialize(&self) -> Result<()> {
        let data_dir = self.config.store.data_dir.clone();

        if let Some(loaded) = self.store.load(&data_dir).await? {
            self.stats.record_documents(loaded);
            info!("Vector store loaded successfully ({} chunks)", loaded);
            self.initialized.store(true, Ordering::SeqCst);
            return Ok(());
        }

        info!("Creating new vector store with curriculum content...");
        let files = self
            .processor
            .collect_curriculum_files(&self.config.ingest.curriculum_dir);

        let mut documents = if files.is_empty() {
            info!(
                "Curriculum directory has no files: {}",
                self.config.ingest.curriculum_dir.display()
            );
            Vec::new()
        } else {
            self.processor.load_documents(&files).await
        };

        if documents.is_empty() {
            warn!("No curriculum documents found, using sample content");
            documents = self.processor.sample_curriculum();
        }

        let chunks = self.processor.split_documents(&documents);
        let added = self.store.create_from_chunks(chunks).await?;
        self.stats.record_documents(added as u64);

        self.store.save(&data_dir).await?;
        info!("Vector store created with {} document chunks", added);

        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// 是否完成初始化
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// 处理一条学生消息
    pub async fn chat(&self, message: &str, subject_filter: Option<Subject>) -> TutorResponse {
        if !self.is_initialized() {
            return TutorResponse {
                answer: NOT_INITIALIZED_REPLY.to_string(),
                sources: Vec::new(),
                student_profile: String::new(),
                confidence: 0.0,
                session_id: self.current_session_id(),
                query_count: self.stats.total_queries(),
                error: Some("System not initialized".to_string()),
            };
        }

        self.stats.record_query();
        let reply = self.pipeline.query(message, subject_filter).await;

        if reply.answer.is_empty() {
            self.stats.record_failure();
        } else {
            self.stats.record_success();
        }

        TutorResponse {
            answer: reply.answer,
            sources: reply.sources,
            student_profile: reply.student_profile,
            confidence: reply.confidence,
            session_id: self.current_session_id(),
            query_count: self.stats.total_queries(),
            error: None,
        }
    }

    /// 开始新会话并清空历史窗口（画像保留）
    pub fn start_session(&self, session_id: Option<String>) -> TutorSession {
        let session = TutorSession::new(session_id);
        self.memory.write().clear();
        *self.current_session.write() = Some(session.clone());

        info!("Started new session: {}", session.id);
        session
    }

    /// 结束当前会话
    pub fn end_session(&self) -> Option<TutorSession> {
        let ended = self.current_session.write().take();
        if let Some(session) = &ended {
            info!("Ended session: {}", session.id);
        }
        ended
    }

    fn current_session_id(&self) -> Option<String> {
        self.current_session.read().as_ref().map(|s| s.id.clone())
    }

    /// 追加课程内容：加载、分块、索引并落盘
    pub async fn add_curriculum(&self, paths: &[PathBuf]) -> Result<usize> {
        if !self.is_initialized() {
            return Err(AppError::Validation("System not initialized".to_string()));
        }

        let documents = self.processor.load_documents(paths).await;
        if documents.is_empty() {
            warn!("No documents loaded");
            return Err(AppError::Document(
                "No documents loaded from provided paths".to_string(),
            ));
        }

        let chunks = self.processor.split_documents(&documents);
        let added = self.store.add_chunks(chunks).await?;
        self.store.save(&self.config.store.data_dir).await?;
        self.stats.record_documents(added as u64);

        info!("Added {} new document chunks", added);
        Ok(added)
    }

    /// 按提问给出最多 3 条学习建议
    pub fn learning_suggestions(&self, query: &str) -> Vec<String> {
        let mut suggestions = Vec::new();

        for subject in self.pipeline.suggest_subjects(query) {
            let canned: &[&str] = match subject {
                Subject::Mathematics => &[
                    "Would you like to practice solving equations?",
                    "Let's explore some real-world math applications!",
                    "How about we work through some step-by-step examples?",
                ],
                Subject::Science => &[
                    "Want to learn about scientific experiments?",
                    "Let's explore how science applies to everyday life!",
                    "Would you like to understand the theory behind this concept?",
                ],
                Subject::English => &[
                    "Let's practice reading comprehension together!",
                    "Would you like help with writing techniques?",
                    "How about we analyze some interesting texts?",
                ],
                _ => &[
                    "Let's break this topic down into smaller parts!",
                    "Would you like to see some examples?",
                    "How about we explore this concept step by step?",
                ],
            };
            suggestions.extend(canned.iter().map(|s| s.to_string()));
        }

        suggestions.truncate(3);
        suggestions
    }

    /// 系统状态与使用统计
    pub async fn status(&self) -> SystemStatus {
        let indexed_chunks = match self.store.count().await {
            Ok(count) => count,
            Err(e) => {
                error!("Error counting indexed chunks: {}", e);
                0
            }
        };

        SystemStatus {
            is_initialized: self.is_initialized(),
            current_session: self.current_session_id(),
            stats: self.stats.snapshot(),
            indexed_chunks,
            model_info: ModelInfo::of(self.chat_model.as_ref()),
        }
    }

    /// 当前记忆（测试与诊断用）
    pub fn memory(&self) -> &Arc<RwLock<ConversationMemory>> {
        &self.memory
    }
}

/// 创建导师系统
pub fn create_tutor_system(config: AppConfig) -> Result<TutorSystem> {
    TutorSystem::new(config)
}
