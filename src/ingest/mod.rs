//! 课程文档摄取模块
//!
//! 负责课程文件加载、学科标注与分块。

pub mod splitter;

pub use splitter::TextSplitter;

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::models::chunk::{ChunkMetadata, CurriculumChunk, FileType, Subject};

/// 摄取后尚未分块的课程文档
#[derive(Debug, Clone)]
pub struct CurriculumDocument {
    /// 全文内容
    pub text: String,
    /// 元数据（分块时逐块继承）
    pub metadata: ChunkMetadata,
}

/// 文件名学科关键词表（按声明顺序匹配，先中先得）
const SUBJECT_KEYWORDS: &[(Subject, &[&str])] = &[
    (
        Subject::Mathematics,
        &["math", "mathematics", "algebra", "geometry", "calculus"],
    ),
    (
        Subject::Science,
        &["science", "physics", "chemistry", "biology"],
    ),
    (Subject::History, &["history", "social", "studies"]),
    (
        Subject::English,
        &["english", "literature", "language", "writing"],
    ),
    (
        Subject::Computer,
        &["computer", "programming", "coding", "cs"],
    ),
];

/// 课程文档处理器
pub struct DocumentProcessor {
    splitter: TextSplitter,
}

impl DocumentProcessor {
    /// 创建处理器
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            splitter: TextSplitter::new(chunk_size, chunk_overlap),
        }
    }

    /// 加载多个课程文件
    ///
    /// 缺失文件与不支持的格式跳过并告警，单个文件的失败不会中断整批。
    pub async fn load_documents(&self, paths: &[PathBuf]) -> Vec<CurriculumDocument> {
        let mut documents = Vec::new();

        for path in paths {
            if !path.exists() {
                warn!("File not found: {}", path.display());
                continue;
            }

            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_default();

            let loaded = match extension.as_str() {
                "txt" => self.load_text(path).await,
                "pdf" => self.load_pdf(path),
                _ => {
                    warn!("Unsupported file format: .{}", extension);
                    continue;
                }
            };

            match loaded {
                Ok(doc) => {
                    info!("Loaded document from {}", path.display());
                    documents.push(doc);
                }
                Err(e) => {
                    error!("Error loading {}: {}", path.display(), e);
                }
            }
        }

        documents
    }

    async fn load_text(&self, path: &Path) -> crate::error::Result<CurriculumDocument> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(CurriculumDocument {
            text,
            metadata: self.metadata_for(path, FileType::Txt),
        })
    }

    fn load_pdf(&self, path: &Path) -> crate::error::Result<CurriculumDocument> {
        let text = pdf_extract::extract_text(path)
            .map_err(|e| crate::error::AppError::Document(e.to_string()))?;
        Ok(CurriculumDocument {
            text,
            metadata: self.metadata_for(path, FileType::Pdf),
        })
    }

    fn metadata_for(&self, path: &Path, file_type: FileType) -> ChunkMetadata {
        let source_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        ChunkMetadata {
            subject: infer_subject(&source_file),
            source_file,
            topic: None,
            file_type,
        }
    }

    /// 把文档切成带重叠的内容块
    pub fn split_documents(&self, documents: &[CurriculumDocument]) -> Vec<CurriculumChunk> {
        let mut chunks = Vec::new();

        for doc in documents {
            for piece in self.splitter.split(&doc.text) {
                chunks.push(CurriculumChunk::new(&piece, doc.metadata.clone()));
            }
        }

        info!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );
        chunks
    }

    /// 递归收集课程目录下的 .txt / .pdf 文件
    pub fn collect_curriculum_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let entries = match std::fs::read_dir(&current) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Cannot read directory {}: {}", current.display(), e);
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let extension = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_lowercase())
                    .unwrap_or_default();
                if extension == "txt" || extension == "pdf" {
                    files.push(path);
                }
            }
        }

        files.sort();
        files
    }

    /// 内置示例课程，在没有任何课程目录时兜底
    pub fn sample_curriculum(&self) -> Vec<CurriculumDocument> {
        SAMPLE_CURRICULUM
            .iter()
            .map(|(subject, topic, text)| CurriculumDocument {
                text: text.to_string(),
                metadata: ChunkMetadata {
                    source_file: "sample_curriculum".to_string(),
                    subject: *subject,
                    topic: Some(topic.to_string()),
                    file_type: FileType::Generated,
                },
            })
            .collect()
    }
}

/// 从文件名推断学科
pub fn infer_subject(filename: &str) -> Subject {
    let filename = filename.to_lowercase();

    for (subject, keywords) in SUBJECT_KEYWORDS {
        if keywords.iter().any(|k| filename.contains(k)) {
            return *subject;
        }
    }

    Subject::General
}

const SAMPLE_CURRICULUM: &[(Subject, &str, &str)] = &[
    (
        Subject::Mathematics,
        "algebra_basics",
        "Mathematics - Algebra Basics\n\n\
         Algebra is a branch of mathematics that uses symbols and letters to \
         represent numbers and quantities in formulas and equations.\n\n\
         Key Concepts:\n\
         1. Variables: letters like x, y, z that stand for unknown values\n\
         2. Constants: fixed numbers like 5, -3, 0.5\n\
         3. Expressions: combinations of variables and constants like 2x + 3\n\
         4. Equations: statements of equality like 2x + 3 = 7\n\n\
         Solving Linear Equations:\n\
         Isolate the variable on one side, apply inverse operations, then \
         check the solution by substituting it back.\n\n\
         Example: solve 2x + 3 = 7. Subtract 3 from both sides to get 2x = 4, \
         divide both sides by 2 to get x = 2, and check that 2(2) + 3 = 7.",
    ),
    (
        Subject::Science,
        "physics_intro",
        "Science - Introduction to Physics\n\n\
         Physics is the study of matter, energy, and their interactions in \
         the universe.\n\n\
         Fundamental Concepts:\n\
         1. Motion: how objects move through space and time\n\
         2. Force: a push or pull that can change an object's motion\n\
         3. Energy: the ability to do work or cause change\n\
         4. Matter: anything that has mass and takes up space\n\n\
         Newton's Laws of Motion:\n\
         1. An object keeps its state of rest or motion unless acted on by an \
         external force.\n\
         2. Force equals mass times acceleration (F = ma).\n\
         3. For every action there is an equal and opposite reaction.\n\n\
         Applications include braking cars, seatbelts, and rocket propulsion.",
    ),
    (
        Subject::English,
        "reading_comprehension",
        "English Literature - Reading Comprehension Strategies\n\n\
         Reading comprehension is the ability to understand, analyze, and \
         interpret written text.\n\n\
         Key Strategies:\n\
         1. Preview titles, headings, and images before reading\n\
         2. Predict what will happen next\n\
         3. Ask yourself questions while reading\n\
         4. Summarize main ideas and key details\n\
         5. Connect the text to your own experiences\n\n\
         Question Types: literal questions about stated information, \
         inferential questions that read between the lines, and critical \
         questions that evaluate the author's purpose.\n\n\
         Active readers highlight important passages, take margin notes, and \
         pause periodically to reflect on what they have learned.",
    ),
];
