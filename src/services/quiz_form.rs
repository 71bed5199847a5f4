//! 在线测验请求构建 - 业务能力层
//!
//! 只负责把题目转换为表单接口的请求体，不发送请求

use serde_json::{json, Value as JsonValue};
use tracing::warn;

use crate::error::ExportError;
use crate::models::Question;

/// 每道题的分值
pub const POINT_VALUE: u32 = 1;

/// 表单请求构建器
pub struct QuizFormBuilder;

impl QuizFormBuilder {
    /// 创建表单的请求体
    pub fn create_form(title: &str) -> JsonValue {
        json!({
            "info": {
                "title": title,
                "documentTitle": title,
            }
        })
    }

    /// 开启测验模式的请求体
    pub fn enable_quiz() -> JsonValue {
        json!({
            "requests": [{
                "updateSettings": {
                    "settings": { "quizSettings": { "isQuiz": true } },
                    "updateMask": "quizSettings.isQuiz",
                }
            }]
        })
    }

    /// 每道题一个单选题目，选项顺序不打乱
    ///
    /// 试卷文件可能被手工修改过，正确答案下标越界时直接报错
    pub fn create_items(questions: &[Question]) -> Result<JsonValue, ExportError> {
        let requests = questions
            .iter()
            .enumerate()
            .map(|(index, q)| Self::create_item(index, q))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(json!({ "requests": requests }))
    }

    fn create_item(index: usize, question: &Question) -> Result<JsonValue, ExportError> {
        let correct = match question.correct_text() {
            Some(text) if question.answers.len() >= 2 => text,
            _ => {
                warn!("⚠️ 题目 {} 的答案不合法", question.id);
                return Err(ExportError::InvalidAnswer {
                    id: question.id,
                    index: question.correct_answer,
                    count: question.answers.len(),
                });
            }
        };

        let options: Vec<JsonValue> = question
            .answers
            .iter()
            .map(|answer| json!({ "value": answer }))
            .collect();

        Ok(json!({
            "createItem": {
                "item": {
                    "title": question.question,
                    "questionItem": {
                        "question": {
                            "required": true,
                            "grading": {
                                "pointValue": POINT_VALUE,
                                "correctAnswers": {
                                    "answers": [{ "value": correct }]
                                }
                            },
                            "choiceQuestion": {
                                "type": "RADIO",
                                "options": options,
                                "shuffle": false,
                            }
                        }
                    }
                },
                "location": { "index": index }
            }
        }))
    }

    /// 授予编辑权限的请求体
    pub fn writer_permission(email: &str) -> JsonValue {
        json!({
            "type": "user",
            "role": "writer",
            "emailAddress": email,
        })
    }

    /// 表单编辑地址
    pub fn edit_url(form_id: &str) -> String {
        format!("https://docs.google.com/forms/d/{}/edit", form_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<Question> {
        vec![
            Question {
                id: 1,
                question: "Capital of France?".to_string(),
                answers: vec!["Lyon".to_string(), "Paris".to_string()],
                correct_answer: 1,
                explanation: None,
            },
            Question {
                id: 2,
                question: "2+2?".to_string(),
                answers: vec!["4".to_string(), "5".to_string(), "6".to_string()],
                correct_answer: 0,
                explanation: Some("Arithmetic.".to_string()),
            },
        ]
    }

    #[test]
    fn test_create_items_one_per_question() {
        let body = QuizFormBuilder::create_items(&questions()).unwrap();
        let requests = body["requests"].as_array().unwrap();
        assert_eq!(requests.len(), 2);

        let first = &requests[0]["createItem"];
        assert_eq!(first["location"]["index"], 0);
        assert_eq!(first["item"]["title"], "Capital of France?");

        let question = &first["item"]["questionItem"]["question"];
        assert_eq!(question["grading"]["pointValue"], 1);
        assert_eq!(question["grading"]["correctAnswers"]["answers"][0]["value"], "Paris");
        assert_eq!(question["choiceQuestion"]["type"], "RADIO");
        assert_eq!(question["choiceQuestion"]["shuffle"], false);
        assert_eq!(question["choiceQuestion"]["options"][1]["value"], "Paris");

        assert_eq!(requests[1]["createItem"]["location"]["index"], 1);
    }

    #[test]
    fn test_out_of_range_answer_is_rejected() {
        let mut qs = questions();
        qs[1].correct_answer = 3;

        match QuizFormBuilder::create_items(&qs) {
            Err(ExportError::InvalidAnswer { id, index, count }) => {
                assert_eq!((id, index, count), (2, 3, 3));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_create_form_and_quiz_settings() {
        let form = QuizFormBuilder::create_form("Geography");
        assert_eq!(form["info"]["title"], "Geography");
        assert_eq!(form["info"]["documentTitle"], "Geography");

        let settings = QuizFormBuilder::enable_quiz();
        assert_eq!(
            settings["requests"][0]["updateSettings"]["settings"]["quizSettings"]["isQuiz"],
            true
        );
    }

    #[test]
    fn test_writer_permission_and_edit_url() {
        let permission = QuizFormBuilder::writer_permission("owner@example.com");
        assert_eq!(permission["role"], "writer");
        assert_eq!(permission["emailAddress"], "owner@example.com");
        assert_eq!(
            QuizFormBuilder::edit_url("abc123"),
            "https://docs.google.com/forms/d/abc123/edit"
        );
    }
}
