//! 学生画像数据模型
//!
//! 记录学习风格、难度偏好、兴趣学科与薄弱点，
//! 每轮对话后通过关键词启发式更新。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::chunk::Subject;

/// 学习风格
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LearningStyle {
    /// 自适应（默认）
    #[serde(rename = "adaptive")]
    Adaptive,
    /// 视觉型（偏好示例与演示）
    #[serde(rename = "visual")]
    Visual,
    /// 分析型（偏好解释与原理）
    #[serde(rename = "analytical")]
    Analytical,
    /// 实践型（偏好练习与动手）
    #[serde(rename = "hands-on")]
    HandsOn,
}

impl LearningStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStyle::Adaptive => "adaptive",
            LearningStyle::Visual => "visual",
            LearningStyle::Analytical => "analytical",
            LearningStyle::HandsOn => "hands-on",
        }
    }
}

/// 难度偏好
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    #[serde(rename = "easy")]
    Easy,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "hard")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// 难度偏好关键词
const EASY_MARKERS: &[&str] = &["easy", "simple", "basic"];
const HARD_MARKERS: &[&str] = &["hard", "difficult", "challenging", "advanced"];

/// 学习风格关键词
const VISUAL_MARKERS: &[&str] = &["example", "show me", "demonstrate"];
const ANALYTICAL_MARKERS: &[&str] = &["explain", "why", "how"];
const HANDS_ON_MARKERS: &[&str] = &["practice", "try", "do"];

/// 学生画像
///
/// 单调累积的可变记录，列表字段只做成员判重，不做进一步去重。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    /// 学习风格
    pub learning_style: LearningStyle,

    /// 难度偏好
    pub difficulty_preference: Difficulty,

    /// 兴趣学科
    pub subjects_of_interest: Vec<Subject>,

    /// 强项
    pub strengths: Vec<String>,

    /// 常见薄弱点
    pub common_mistakes: Vec<String>,

    /// 累计轮次数
    pub session_count: u64,

    /// 最后一次互动时间
    pub last_session: Option<DateTime<Utc>>,
}

impl StudentProfile {
    /// 创建新画像
    pub fn new() -> Self {
        Self {
            learning_style: LearningStyle::Adaptive,
            difficulty_preference: Difficulty::Medium,
            subjects_of_interest: Vec::new(),
            strengths: Vec::new(),
            common_mistakes: Vec::new(),
            session_count: 0,
            last_session: None,
        }
    }

    /// 根据学生提问更新难度与学习风格偏好
    pub fn observe_question(&mut self, question: &str) {
        let input = question.to_lowercase();

        if EASY_MARKERS.iter().any(|m| input.contains(m)) {
            self.difficulty_preference = Difficulty::Easy;
        } else if HARD_MARKERS.iter().any(|m| input.contains(m)) {
            self.difficulty_preference = Difficulty::Hard;
        }

        if VISUAL_MARKERS.iter().any(|m| input.contains(m)) {
            self.learning_style = LearningStyle::Visual;
        } else if ANALYTICAL_MARKERS.iter().any(|m| input.contains(m)) {
            self.learning_style = LearningStyle::Analytical;
        } else if HANDS_ON_MARKERS.iter().any(|m| input.contains(m)) {
            self.learning_style = LearningStyle::HandsOn;
        }
    }

    /// 记录兴趣学科
    pub fn note_interest(&mut self, subject: Subject) {
        if !self.subjects_of_interest.contains(&subject) {
            self.subjects_of_interest.push(subject);
        }
    }

    /// 记录强项
    pub fn add_strength(&mut self, strength: &str) {
        if !self.strengths.iter().any(|s| s == strength) {
            self.strengths.push(strength.to_string());
        }
    }

    /// 记录薄弱点
    pub fn add_mistake(&mut self, mistake: &str) {
        if !self.common_mistakes.iter().any(|m| m == mistake) {
            self.common_mistakes.push(mistake.to_string());
        }
    }

    /// 推进轮次计数并刷新互动时间
    pub fn record_interaction(&mut self) {
        self.session_count += 1;
        self.last_session = Some(Utc::now());
    }

    /// 画像摘要（展示用，竖线分隔）
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.subjects_of_interest.is_empty() {
            let subjects: Vec<&str> = self
                .subjects_of_interest
                .iter()
                .map(|s| s.as_str())
                .collect();
            parts.push(format!("Interested in: {}", subjects.join(", ")));
        }

        if !self.strengths.is_empty() {
            parts.push(format!("Strengths: {}", self.strengths.join(", ")));
        }

        if !self.common_mistakes.is_empty() {
            parts.push(format!(
                "Areas for improvement: {}",
                self.common_mistakes.join(", ")
            ));
        }

        parts.push(format!("Learning style: {}", self.learning_style.as_str()));
        parts.push(format!(
            "Preferred difficulty: {}",
            self.difficulty_preference.as_str()
        ));
        parts.push(format!("Sessions completed: {}", self.session_count));

        if parts.is_empty() {
            "New student profile".to_string()
        } else {
            parts.join(" | ")
        }
    }

    /// 提示词用的个性化上下文块
    pub fn prompt_context(&self) -> String {
        let mut lines = vec![
            "STUDENT CONTEXT:".to_string(),
            format!("Learning Style: {}", self.learning_style.as_str()),
            format!(
                "Difficulty Preference: {}",
                self.difficulty_preference.as_str()
            ),
            format!("Session Count: {}", self.session_count),
        ];

        if !self.subjects_of_interest.is_empty() {
            let subjects: Vec<&str> = self
                .subjects_of_interest
                .iter()
                .map(|s| s.as_str())
                .collect();
            lines.push(format!("Interested Subjects: {}", subjects.join(", ")));
        }

        if !self.strengths.is_empty() {
            lines.push(format!("Strengths: {}", self.strengths.join(", ")));
        }

        if !self.common_mistakes.is_empty() {
            lines.push(format!("Areas to Focus: {}", self.common_mistakes.join(", ")));
        }

        lines.join("\n")
    }
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let profile = StudentProfile::new();
        assert_eq!(profile.learning_style, LearningStyle::Adaptive);
        assert_eq!(profile.difficulty_preference, Difficulty::Medium);
        assert_eq!(profile.session_count, 0);
    }

    #[test]
    fn test_observe_difficulty_markers() {
        let mut profile = StudentProfile::new();

        profile.observe_question("Can you give me a simple overview?");
        assert_eq!(profile.difficulty_preference, Difficulty::Easy);

        profile.observe_question("I want something more challenging now");
        assert_eq!(profile.difficulty_preference, Difficulty::Hard);
    }

    #[test]
    fn test_observe_learning_style_markers() {
        let mut profile = StudentProfile::new();

        profile.observe_question("show me an example of a linear equation");
        assert_eq!(profile.learning_style, LearningStyle::Visual);

        profile.observe_question("explain why the slope matters");
        assert_eq!(profile.learning_style, LearningStyle::Analytical);

        profile.observe_question("let me practice a few problems");
        assert_eq!(profile.learning_style, LearningStyle::HandsOn);
    }

    #[test]
    fn test_interest_membership_check() {
        let mut profile = StudentProfile::new();
        profile.note_interest(Subject::Mathematics);
        profile.note_interest(Subject::Mathematics);
        profile.note_interest(Subject::Science);
        assert_eq!(profile.subjects_of_interest.len(), 2);
    }

    #[test]
    fn test_summary_for_new_profile() {
        let profile = StudentProfile::new();
        let summary = profile.summary();
        assert!(summary.contains("Learning style: adaptive"));
        assert!(summary.contains("Preferred difficulty: medium"));
        assert!(summary.contains("Sessions completed: 0"));
    }

    #[test]
    fn test_prompt_context_includes_accumulated_lists() {
        let mut profile = StudentProfile::new();
        profile.note_interest(Subject::Science);
        profile.add_strength("fractions");
        profile.add_mistake("sign errors");

        let context = profile.prompt_context();
        assert!(context.starts_with("STUDENT CONTEXT:"));
        assert!(context.contains("Interested Subjects: science"));
        assert!(context.contains("Strengths: fractions"));
        assert!(context.contains("Areas to Focus: sign errors"));
    }
}
