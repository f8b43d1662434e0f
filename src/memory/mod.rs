//! 对话记忆模块
//!
//! 维护有界的历史轮次窗口和随对话演进的学生画像。
//! 窗口保留最近 `2 * max_history` 轮，超出即淘汰最旧轮次。

use std::collections::VecDeque;
use tracing::info;

use crate::models::profile::StudentProfile;
use crate::models::turn::{ConversationTurn, TurnMetadata};

/// 拼接上下文时引用的最近轮次数
const CONTEXT_TURNS: usize = 3;

/// 上下文中回答的最大长度（字符）
const ANSWER_PREVIEW_CHARS: usize = 200;

/// 对话记忆管理器
pub struct ConversationMemory {
    max_history: usize,
    turns: VecDeque<ConversationTurn>,
    profile: StudentProfile,
}

impl ConversationMemory {
    /// 创建记忆管理器
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            turns: VecDeque::new(),
            profile: StudentProfile::new(),
        }
    }

    /// 记录一轮对话并更新画像
    pub fn record(&mut self, question: &str, answer: &str, metadata: TurnMetadata) {
        if let Some(subject) = metadata.subject {
            self.profile.note_interest(subject);
        }
        self.profile.observe_question(question);
        self.profile.record_interaction();

        self.turns
            .push_back(ConversationTurn::new(question, answer, metadata));

        while self.turns.len() > self.max_history * 2 {
            self.turns.pop_front();
        }

        info!("Added interaction to conversation memory");
    }

    /// 最近几轮对话的格式化上下文
    pub fn recent_context(&self) -> String {
        if self.turns.is_empty() {
            return "This is the beginning of our conversation.".to_string();
        }

        let start = self.turns.len().saturating_sub(CONTEXT_TURNS);
        let mut parts = Vec::new();

        for turn in self.turns.iter().skip(start) {
            parts.push(format!("Student: {}", turn.question));
            parts.push(format!(
                "Tutor: {}",
                turn.answer_preview(ANSWER_PREVIEW_CHARS)
            ));
        }

        parts.join("\n")
    }

    /// 画像摘要（展示用）
    pub fn profile_summary(&self) -> String {
        self.profile.summary()
    }

    /// 个性化提示词上下文
    pub fn personalized_context(&self) -> String {
        self.profile.prompt_context()
    }

    /// 当前画像
    pub fn profile(&self) -> &StudentProfile {
        &self.profile
    }

    /// 历史轮次
    pub fn history(&self) -> &VecDeque<ConversationTurn> {
        &self.turns
    }

    /// 历史轮次数
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// 清空历史窗口，画像保留
    pub fn clear(&mut self) {
        self.turns.clear();
        info!("Conversation memory cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chunk::Subject;
    use crate::models::profile::{Difficulty, LearningStyle};

    fn meta(subject: Option<Subject>) -> TurnMetadata {
        TurnMetadata {
            subject,
            num_sources: 0,
            sources: vec![],
        }
    }

    #[test]
    fn test_empty_memory_context() {
        let memory = ConversationMemory::new(10);
        assert_eq!(
            memory.recent_context(),
            "This is the beginning of our conversation."
        );
    }

    #[test]
    fn test_record_updates_profile() {
        let mut memory = ConversationMemory::new(10);
        memory.record(
            "explain why fractions work this way",
            "Fractions represent parts of a whole.",
            meta(Some(Subject::Mathematics)),
        );

        assert_eq!(memory.profile().session_count, 1);
        assert_eq!(memory.profile().learning_style, LearningStyle::Analytical);
        assert!(
            memory
                .profile()
                .subjects_of_interest
                .contains(&Subject::Mathematics)
        );
    }

    #[test]
    fn test_window_eviction() {
        let mut memory = ConversationMemory::new(2);

        for i in 0..10 {
            memory.record(&format!("question {}", i), "answer", meta(None));
        }

        // 窗口上限是 2 * max_history
        assert_eq!(memory.len(), 4);
        assert_eq!(memory.history()[0].question, "question 6");
    }

    #[test]
    fn test_recent_context_last_three_turns() {
        let mut memory = ConversationMemory::new(10);
        for i in 0..5 {
            memory.record(&format!("q{}", i), &format!("a{}", i), meta(None));
        }

        let context = memory.recent_context();
        assert!(!context.contains("q1"));
        assert!(context.contains("q2"));
        assert!(context.contains("q4"));
        assert!(context.contains("Tutor: a4"));
    }

    #[test]
    fn test_recent_context_truncates_long_answers() {
        let mut memory = ConversationMemory::new(10);
        memory.record("q", &"long answer ".repeat(50), meta(None));

        let context = memory.recent_context();
        assert!(context.contains("..."));
    }

    #[test]
    fn test_clear_keeps_profile() {
        let mut memory = ConversationMemory::new(10);
        memory.record(
            "give me a simple example",
            "Sure.",
            meta(Some(Subject::Science)),
        );
        memory.clear();

        assert!(memory.is_empty());
        assert_eq!(memory.profile().session_count, 1);
        assert_eq!(memory.profile().difficulty_preference, Difficulty::Easy);
    }
}
