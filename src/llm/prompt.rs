//! 提示词模板与回复清理
//!
//! 导师人设提示词（普通版与检索增强版）以及模型输出的
//! 规整逻辑：去提示词回显、去特殊标记、限制回复长度。

/// 回复长度上限（句子数）
const MAX_SENTENCES: usize = 4;

/// 处理整体失败时的固定回复
pub const PIPELINE_APOLOGY: &str = "I apologize, but I encountered an error while processing \
     your question. Please try rephrasing it or ask something else.";

/// 模型输出为空时的固定回复
const EMPTY_RESPONSE_FALLBACK: &str = "I'd be happy to help you with that! Could you provide a \
     bit more detail about what you'd like to learn?";

/// 检索增强提示词：课程上下文 + 学生画像 + 当前问题
pub fn rag_prompt(context: &str, student_context: &str, question: &str) -> String {
    format!(
        "You are Mira, a warm and empathetic tutor at Mentor. You help students learn course \
         content in an interactive, memory-aware, and human-like way.\n\n\
         {student_context}\n\n\
         RELEVANT CURRICULUM CONTENT:\n\
         {context}\n\n\
         CURRENT QUESTION: {question}\n\n\
         Instructions:\n\
         1. Use the curriculum content to provide accurate, educational responses\n\
         2. Adapt your teaching style to the student's learning preferences\n\
         3. Break down complex concepts into manageable parts\n\
         4. Provide examples and real-world applications\n\
         5. Ask follow-up questions to check understanding\n\
         6. Be encouraging and supportive\n\
         7. If the curriculum content doesn't contain relevant information, use your general \
         knowledge but acknowledge the limitation\n\n\
         Respond as Mira would - warm, educational, and focused on the student's learning \
         journey:"
    )
}

/// 无检索回退提示词：仅历史对话 + 当前问题
pub fn fallback_prompt(chat_history: &str, question: &str) -> String {
    format!(
        "You are Mira, a tutor at Mentor. You're warm, empathetic, and focused on helping \
         students learn.\n\n\
         Previous conversation:\n\n\
         {chat_history}\n\n\
         Student question: {question}\n\n\
         Provide a helpful, educational response that encourages learning:"
    )
}

/// 规整模型输出
pub fn clean_response(response: &str, original_prompt: &str) -> String {
    let mut response = if response.contains(original_prompt) {
        response.replace(original_prompt, "")
    } else {
        response.to_string()
    };

    for artifact in ["<|endoftext|>", "</s>", "<s>"] {
        response = response.replace(artifact, "");
    }

    let response = response.trim().to_string();
    if response.is_empty() {
        return EMPTY_RESPONSE_FALLBACK.to_string();
    }

    let sentences: Vec<&str> = response.split(". ").collect();
    if sentences.len() > MAX_SENTENCES {
        return format!("{}.", sentences[..MAX_SENTENCES].join(". "));
    }

    response
}
