//! 提示词构建 - 业务能力层
//!
//! 只负责把"主题 + 题目数 + 选项数"变成发给模型的指令，没有副作用

use crate::models::ExamRequest;

/// 返回 JSON 顶层的题目列表字段
pub const QUESTIONS_FIELD: &str = "questions";
pub const QUESTION_FIELD: &str = "question";
pub const ANSWERS_FIELD: &str = "answers";
pub const CORRECT_ANSWER_FIELD: &str = "correct_answer_index";
pub const EXPLANATION_FIELD: &str = "explanation";

/// 提示词构建器
pub struct PromptBuilder;

impl PromptBuilder {
    /// 构建生成试卷的提示词
    ///
    /// 提示词中写明了返回的 JSON 结构，`ResponseParser` 按同样的结构解析
    pub fn build(topics: &str, question_count: usize, answer_count: usize) -> String {
        format!(
            "Create a JSON object containing an exam with {question_count} multiple choice questions \
about {topics}. Each question should have exactly {answer_count} possible answers and exactly one correct answer. \
In the explanation field, explain why the correct answer is correct and why the others are not. \
Do not refer to any source document in the explanation. \
If you have access to any files, use them to generate the questions. \
Respond with the JSON object only, without any other text. \
Format the response as a JSON object with this structure:
{{
  \"{QUESTIONS_FIELD}\": [
    {{
      \"{QUESTION_FIELD}\": \"Question text\",
      \"{ANSWERS_FIELD}\": [\"answer1\", \"answer2\", ...],
      \"{CORRECT_ANSWER_FIELD}\": 0,
      \"{EXPLANATION_FIELD}\": \"Explanation of the correct answer\"
    }}
  ]
}}
The \"{CORRECT_ANSWER_FIELD}\" value is the zero-based position of the correct answer in \"{ANSWERS_FIELD}\"."
        )
    }

    /// 按已校验的请求构建提示词
    pub fn for_request(request: &ExamRequest) -> String {
        Self::build(&request.topics, request.question_count, request.answer_count)
    }
}
