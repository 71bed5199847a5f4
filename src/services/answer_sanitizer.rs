//! 答案清洗 - 业务能力层
//!
//! 处理手工编号的题目文本：去掉题号 / 选项字母前缀，识别加粗标记的正确答案

use once_cell::sync::Lazy;
use regex::Regex;

/// 题号前缀，如 `3. `
static QUESTION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[0-9]+\.\s*").expect("题号正则无效"));

/// 题号行：题号后必须是空白或行尾，`2.5 kg` 这样的小数不算
static QUESTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[0-9]+\.(\s|$)").expect("题号行正则无效"));

/// 选项前缀，如 `b) ` 或 `C. `
static ANSWER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[a-eA-E][).]\s*").expect("选项正则无效"));

/// 正确答案的加粗标记
pub const BOLD_MARKER: &str = "**";

/// 答案清洗器
pub struct AnswerSanitizer;

impl AnswerSanitizer {
    /// 去掉行首的题号（`is_question`）或选项字母前缀，替换为一个空格
    ///
    /// 只替换第一个匹配，没有匹配时原样返回
    pub fn sanitize_line(line: &str, is_question: bool) -> String {
        let pattern = if is_question {
            &*QUESTION_PREFIX
        } else {
            &*ANSWER_PREFIX
        };
        pattern.replacen(line, 1, " ").into_owned()
    }

    /// 行首是否带题号
    pub fn is_question_line(line: &str) -> bool {
        QUESTION_LINE.is_match(line)
    }

    /// 行首是否带选项字母
    pub fn is_answer_line(line: &str) -> bool {
        ANSWER_PREFIX.is_match(line)
    }

    /// 返回第一个包含加粗标记的答案下标，没有则返回 None
    pub fn detect_marked_answer<S: AsRef<str>>(answers: &[S]) -> Option<usize> {
        answers
            .iter()
            .position(|answer| answer.as_ref().contains(BOLD_MARKER))
    }

    /// 去掉加粗标记
    pub fn strip_marker(text: &str) -> String {
        text.replace(BOLD_MARKER, "")
    }
}
