//! 旧格式文本导入 - 业务能力层
//!
//! 解析手工编号的题目文本：
//!
//! ```text
//! 1. What is the capital of France?
//! a) Lyon
//! b) **Paris**
//! c) Marseille
//! Explanation: Paris has been the capital since 987.
//! ```
//!
//! 正确答案用加粗标记，没有结构化的答案下标

use crate::error::ParseError;
use crate::models::Question;
use crate::services::answer_sanitizer::AnswerSanitizer;

const EXPLANATION_PREFIX: &str = "explanation:";

/// 正在收集的题目
#[derive(Default)]
struct Draft {
    question: String,
    answers: Vec<String>,
    explanation: Option<String>,
}

pub struct LegacyTextParser;

impl LegacyTextParser {
    /// 解析整段文本，任一题目不完整则整体失败
    pub fn parse(text: &str) -> Result<Vec<Question>, ParseError> {
        let mut drafts: Vec<Draft> = Vec::new();

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if AnswerSanitizer::is_question_line(trimmed) {
                drafts.push(Draft {
                    question: AnswerSanitizer::sanitize_line(trimmed, true).trim().to_string(),
                    ..Default::default()
                });
                continue;
            }

            let position = drafts.len();
            let Some(draft) = drafts.last_mut() else {
                return Err(ParseError::schema(None, "question", format!("题号之前出现内容: {}", trimmed)));
            };

            if AnswerSanitizer::is_answer_line(trimmed) {
                draft
                    .answers
                    .push(AnswerSanitizer::sanitize_line(trimmed, false).trim().to_string());
            } else if trimmed.to_ascii_lowercase().starts_with(EXPLANATION_PREFIX) {
                let explanation = trimmed[EXPLANATION_PREFIX.len()..].trim();
                draft.explanation = Some(AnswerSanitizer::strip_marker(explanation).trim().to_string());
            } else if draft.answers.is_empty() {
                // 题干换行
                draft.question.push(' ');
                draft.question.push_str(trimmed);
            } else {
                return Err(ParseError::schema(
                    Some(position),
                    "answers",
                    format!("无法识别的行: {}", trimmed),
                ));
            }
        }

        drafts
            .into_iter()
            .enumerate()
            .map(|(idx, draft)| Self::finish(idx + 1, draft))
            .collect()
    }

    fn finish(position: usize, draft: Draft) -> Result<Question, ParseError> {
        let question = AnswerSanitizer::strip_marker(&draft.question).trim().to_string();
        if question.is_empty() {
            return Err(ParseError::schema(Some(position), "question", "内容为空"));
        }
        if draft.answers.len() < 2 {
            return Err(ParseError::schema(
                Some(position),
                "answers",
                format!("至少需要 2 个选项，实际为 {}", draft.answers.len()),
            ));
        }

        let correct_answer = AnswerSanitizer::detect_marked_answer(&draft.answers)
            .ok_or_else(|| ParseError::schema(Some(position), "correct_answer", "没有加粗标记的答案"))?;

        let answers: Vec<String> = draft
            .answers
            .iter()
            .map(|a| AnswerSanitizer::strip_marker(a).trim().to_string())
            .collect();
        if answers.iter().any(|a| a.is_empty()) {
            return Err(ParseError::schema(Some(position), "answers", "存在空选项"));
        }

        Ok(Question {
            id: position,
            question,
            answers,
            correct_answer,
            explanation: draft.explanation.filter(|e| !e.is_empty()),
        })
    }
}
