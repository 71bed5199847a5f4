//! Markdown 渲染 - 业务能力层
//!
//! 把题目渲染成勾选框形式的 Markdown

use std::fmt::Write;

use crate::models::{ExportMode, Question};

pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// 渲染题目列表
    ///
    /// `WithAnswers` 模式下勾选正确答案并附上解析
    pub fn render(questions: &[Question], mode: ExportMode) -> String {
        let mut markdown = String::new();

        for (index, question) in questions.iter().enumerate() {
            let _ = write!(markdown, "**{}. {}**\n\n", index + 1, question.question);

            for (i, answer) in question.answers.iter().enumerate() {
                let checked = mode == ExportMode::WithAnswers && i == question.correct_answer;
                let mark = if checked { "X" } else { " " };
                let _ = writeln!(markdown, "- [{}] {}", mark, answer);
            }

            markdown.push('\n');

            if mode == ExportMode::WithAnswers {
                if let Some(explanation) = &question.explanation {
                    let _ = write!(markdown, "**Explanation:** {}\n\n", explanation);
                }
            }
        }

        markdown
    }
}
