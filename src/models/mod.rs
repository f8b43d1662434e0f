//! 核心数据模型模块
//!
//! 定义 Mentor 的核心数据结构：CurriculumChunk, ConversationTurn,
//! StudentProfile, TutorSession 等。

pub mod chunk;
pub mod profile;
pub mod session;
pub mod turn;

pub use chunk::*;
pub use profile::*;
pub use session::*;
pub use turn::*;
