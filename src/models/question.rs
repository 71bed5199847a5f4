use serde::{Deserialize, Serialize};

/// 单道选择题
///
/// 由一次生成响应创建，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 题号（从1开始，按生成顺序）
    pub id: usize,
    pub question: String,
    pub answers: Vec<String>,
    /// 正确答案在 `answers` 中的下标（从0开始）
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// 正确答案的文本
    pub fn correct_text(&self) -> Option<&str> {
        self.answers.get(self.correct_answer).map(String::as_str)
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题干以便显示（最多80个字符）
        let preview = if self.question.chars().count() > 80 {
            self.question.chars().take(80).collect::<String>() + "..."
        } else {
            self.question.clone()
        };
        write!(f, "#{} {} [{} 个选项]", self.id, preview, self.answers.len())
    }
}

/// 一次生成请求的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamRequest {
    pub topics: String,
    pub question_count: usize,
    pub answer_count: usize,
}

impl ExamRequest {
    /// 创建请求，题目数必须大于 0，选项数不少于 2
    pub fn new(
        topics: impl Into<String>,
        question_count: usize,
        answer_count: usize,
    ) -> Result<Self, String> {
        let topics = topics.into();
        if topics.trim().is_empty() {
            return Err("主题不能为空".to_string());
        }
        if question_count == 0 {
            return Err("题目数量必须大于 0".to_string());
        }
        if answer_count < 2 {
            return Err(format!("选项数量至少为 2，实际为 {}", answer_count));
        }
        Ok(Self {
            topics,
            question_count,
            answer_count,
        })
    }
}
