//! 递归字符分块器
//!
//! 按分隔符级联（段落、换行、空格、字符）把长文本切成
//! 带重叠的定长块。长度一律按字符计，避免多字节截断。

/// 文本分块器
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    /// 创建分块器，使用默认分隔符级联
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }

    /// 把文本切成带重叠的块
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        // 选第一个在文本中出现的分隔符，空串兜底
        let mut separator = separators.last().cloned().unwrap_or_default();
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() || text.contains(sep.as_str()) {
                separator = sep.clone();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(|c| c.to_string()).collect()
        } else {
            text.split(separator.as_str())
                .map(|s| s.to_string())
                .collect()
        };

        let mut final_chunks = Vec::new();
        let mut good_splits: Vec<String> = Vec::new();

        for piece in splits {
            if char_len(&piece) < self.chunk_size {
                good_splits.push(piece);
            } else {
                if !good_splits.is_empty() {
                    final_chunks.extend(self.merge_splits(&good_splits, &separator));
                    good_splits.clear();
                }
                if remaining.is_empty() {
                    final_chunks.push(piece);
                } else {
                    final_chunks.extend(self.split_with(&piece, remaining));
                }
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits, &separator));
        }

        final_chunks
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// 把小片段合并成不超过 chunk_size 的块，块间保留 chunk_overlap 重叠
    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut total = 0usize;

        for piece in splits {
            let piece_len = char_len(piece);
            let join_len = if current.is_empty() { 0 } else { sep_len };

            if total + piece_len + join_len > self.chunk_size && !current.is_empty() {
                docs.push(current.join(separator));

                // 从头部弹出，直到剩余长度落进重叠窗口
                while total > self.chunk_overlap
                    || (total + piece_len + join_len > self.chunk_size && total > 0)
                {
                    let dropped = char_len(&current[0]);
                    total -= dropped + if current.len() > 1 { sep_len } else { 0 };
                    current.remove(0);
                }
            }

            if !current.is_empty() {
                total += sep_len;
            }
            total += piece_len;
            current.push(piece.clone());
        }

        if !current.is_empty() {
            docs.push(current.join(separator));
        }

        docs
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = TextSplitter::new(1000, 200);
        let chunks = splitter.split("Algebra uses symbols to represent numbers.");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_paragraphs_preferred_over_lines() {
        let splitter = TextSplitter::new(40, 0);
        let text = "first paragraph here\n\nsecond paragraph here\n\nthird paragraph here";
        let chunks = splitter.split(text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 40, "oversized chunk: {}", chunk);
        }
    }

    #[test]
    fn test_overlap_repeats_tail_content() {
        let splitter = TextSplitter::new(20, 8);
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = splitter.split(text);

        assert!(chunks.len() >= 2);
        // 相邻块应共享词
        let shares_overlap = chunks.windows(2).any(|pair| {
            pair[0]
                .split_whitespace()
                .any(|w| pair[1].split_whitespace().any(|v| v == w))
        });
        assert!(shares_overlap);
    }

    #[test]
    fn test_unsplittable_run_falls_back_to_chars() {
        let splitter = TextSplitter::new(10, 2);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = splitter.split(text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let splitter = TextSplitter::new(10, 2);
        let text = "数学是研究数量结构以及空间变化的学科，代数是其分支之一。";
        let chunks = splitter.split(text);
        assert!(!chunks.is_empty());
    }

    #[rstest]
    #[case(100, 20)]
    #[case(50, 10)]
    #[case(30, 0)]
    fn test_chunk_size_respected(#[case] size: usize, #[case] overlap: usize) {
        let splitter = TextSplitter::new(size, overlap);
        let text = "word ".repeat(200);
        for chunk in splitter.split(&text) {
            assert!(chunk.chars().count() <= size);
        }
    }
}
