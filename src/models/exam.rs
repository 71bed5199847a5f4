use serde::{Deserialize, Serialize};

use super::question::Question;

/// 一份试卷，生成和导出之间保存到文件的单位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub title: String,
    #[serde(default)]
    pub topics: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Exam {
    pub fn new(title: impl Into<String>, topics: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            title: title.into(),
            topics: topics.into(),
            questions,
        }
    }
}

/// 文档导出模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// 只显示题目和选项
    QuestionsOnly,
    /// 标出正确答案并附上解析
    WithAnswers,
}
