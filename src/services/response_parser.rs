//! 返回内容解析 - 业务能力层
//!
//! 把模型返回的 JSON 文本校验并转换为 `Question` 列表
//!
//! 解析步骤：
//! 1. 去掉首尾的代码块标记（以及紧跟其后的语言标记，如 `json`）
//! 2. 解码为通用 JSON 值，失败则为 `MalformedResponse`
//! 3. 校验顶层 `questions` 列表和每道题的字段，失败则为 `SchemaViolation`

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::error::ParseError;
use crate::models::Question;
use crate::services::prompt_builder::{
    ANSWERS_FIELD, CORRECT_ANSWER_FIELD, EXPLANATION_FIELD, QUESTIONS_FIELD, QUESTION_FIELD,
};

const FENCE: char = '`';

/// 返回内容解析器
pub struct ResponseParser;

impl ResponseParser {
    /// 解析模型返回的文本
    ///
    /// 输出保持题目顺序，`id` 为题目在列表中的位置（从1开始）
    pub fn parse(raw: &str) -> Result<Vec<Question>, ParseError> {
        let cleaned = Self::strip_fences(raw);

        let value: JsonValue = serde_json::from_str(cleaned)
            .map_err(|e| ParseError::MalformedResponse { source: e })?;

        let entries = value
            .get(QUESTIONS_FIELD)
            .ok_or_else(|| ParseError::schema(None, QUESTIONS_FIELD, "缺少字段"))?
            .as_array()
            .ok_or_else(|| ParseError::schema(None, QUESTIONS_FIELD, "不是列表"))?;

        let questions = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| Self::parse_entry(idx + 1, entry))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("解析得到 {} 个题目", questions.len());
        Ok(questions)
    }

    /// 去掉首尾的代码块标记
    ///
    /// 开头标记后紧跟的语言标记（如 ```` ```json ````）一并去掉
    pub fn strip_fences(raw: &str) -> &str {
        let trimmed = raw.trim();
        if !trimmed.starts_with(FENCE) {
            return trimmed.trim_end_matches(FENCE).trim_end();
        }

        let mut body = trimmed.trim_start_matches(FENCE);
        let tag_len = body
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '-')
            .unwrap_or(body.len());
        // 语言标记只可能出现在第一行，且 JSON 不会以字母开头
        if tag_len > 0 {
            body = &body[tag_len..];
        }

        body.trim_end().trim_end_matches(FENCE).trim()
    }

    fn parse_entry(position: usize, entry: &JsonValue) -> Result<Question, ParseError> {
        let object = entry
            .as_object()
            .ok_or_else(|| ParseError::schema(Some(position), "entry", "不是对象"))?;

        let question = Self::required_text(object, position, QUESTION_FIELD)?;
        let answers = Self::required_answers(object, position)?;
        let correct_answer = Self::required_index(object, position, answers.len())?;
        let explanation = Self::optional_text(object, position, EXPLANATION_FIELD)?;

        Ok(Question {
            id: position,
            question,
            answers,
            correct_answer,
            explanation,
        })
    }

    fn required_text(
        object: &Map<String, JsonValue>,
        position: usize,
        field: &str,
    ) -> Result<String, ParseError> {
        let text = object
            .get(field)
            .ok_or_else(|| ParseError::schema(Some(position), field, "缺少字段"))?
            .as_str()
            .ok_or_else(|| ParseError::schema(Some(position), field, "不是字符串"))?
            .trim();

        if text.is_empty() {
            return Err(ParseError::schema(Some(position), field, "内容为空"));
        }
        Ok(text.to_string())
    }

    fn required_answers(
        object: &Map<String, JsonValue>,
        position: usize,
    ) -> Result<Vec<String>, ParseError> {
        let items = object
            .get(ANSWERS_FIELD)
            .ok_or_else(|| ParseError::schema(Some(position), ANSWERS_FIELD, "缺少字段"))?
            .as_array()
            .ok_or_else(|| ParseError::schema(Some(position), ANSWERS_FIELD, "不是列表"))?;

        if items.len() < 2 {
            return Err(ParseError::schema(
                Some(position),
                ANSWERS_FIELD,
                format!("至少需要 2 个选项，实际为 {}", items.len()),
            ));
        }

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let text = item.as_str().ok_or_else(|| {
                    ParseError::schema(Some(position), ANSWERS_FIELD, format!("第 {} 个选项不是字符串", i + 1))
                })?;
                let text = text.trim();
                if text.is_empty() {
                    return Err(ParseError::schema(
                        Some(position),
                        ANSWERS_FIELD,
                        format!("第 {} 个选项为空", i + 1),
                    ));
                }
                Ok(text.to_string())
            })
            .collect()
    }

    fn required_index(
        object: &Map<String, JsonValue>,
        position: usize,
        answer_count: usize,
    ) -> Result<usize, ParseError> {
        let value = object
            .get(CORRECT_ANSWER_FIELD)
            .ok_or_else(|| ParseError::schema(Some(position), CORRECT_ANSWER_FIELD, "缺少字段"))?;

        // 负数和小数都不是合法下标
        let index = value.as_i64().ok_or_else(|| {
            ParseError::schema(Some(position), CORRECT_ANSWER_FIELD, format!("不是整数: {}", value))
        })?;

        if index < 0 || index as usize >= answer_count {
            return Err(ParseError::schema(
                Some(position),
                CORRECT_ANSWER_FIELD,
                format!("{} 超出范围 [0, {})", index, answer_count),
            ));
        }
        Ok(index as usize)
    }

    fn optional_text(
        object: &Map<String, JsonValue>,
        position: usize,
        field: &str,
    ) -> Result<Option<String>, ParseError> {
        match object.get(field) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.trim().to_string())),
            Some(_) => Err(ParseError::schema(Some(position), field, "不是字符串")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// 按提示词约定的结构序列化题目
    fn to_payload(questions: &[Question]) -> String {
        let entries: Vec<JsonValue> = questions
            .iter()
            .map(|q| {
                json!({
                    "question": q.question,
                    "answers": q.answers,
                    "correct_answer_index": q.correct_answer,
                    "explanation": q.explanation,
                })
            })
            .collect();
        serde_json::to_string_pretty(&json!({ "questions": entries })).unwrap()
    }

    fn sample_questions() -> Vec<Question> {
        vec![
            Question {
                id: 1,
                question: "What is 2+2?".to_string(),
                answers: vec!["3".to_string(), "4".to_string(), "5".to_string()],
                correct_answer: 1,
                explanation: Some("2+2 equals 4.".to_string()),
            },
            Question {
                id: 2,
                question: "Which is a prime number?".to_string(),
                answers: vec!["4".to_string(), "6".to_string(), "7".to_string()],
                correct_answer: 2,
                explanation: None,
            },
            Question {
                id: 3,
                question: "Largest planet?".to_string(),
                answers: vec!["Jupiter".to_string(), "Mars".to_string()],
                correct_answer: 0,
                explanation: Some("Jupiter is the largest.".to_string()),
            },
        ]
    }

    fn schema_field(err: ParseError) -> (Option<usize>, String) {
        match err {
            ParseError::SchemaViolation { position, field, .. } => (position, field),
            other => panic!("期望 SchemaViolation，实际为 {:?}", other),
        }
    }

    #[test]
    fn test_parse_reproduces_serialized_questions() {
        let questions = sample_questions();
        let parsed = ResponseParser::parse(&to_payload(&questions)).unwrap();
        assert_eq!(parsed, questions);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let payload = to_payload(&sample_questions());
        let first = ResponseParser::parse(&payload).unwrap();
        let second = ResponseParser::parse(&payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_trims_text() {
        let raw = r#"{"questions":[{"question":"  Capital of France?\n","answers":[" Paris ","\tLyon"],"correct_answer_index":0}]}"#;
        let parsed = ResponseParser::parse(raw).unwrap();
        assert_eq!(parsed[0].question, "Capital of France?");
        assert_eq!(parsed[0].answers, vec!["Paris", "Lyon"]);
        assert_eq!(parsed[0].explanation, None);
    }

    #[test]
    fn test_fenced_payload_parses_like_plain() {
        let payload = to_payload(&sample_questions());
        let fenced = format!("```json\n{}\n```", payload);
        let bare_fence = format!("```\n{}\n```", payload);

        let plain = ResponseParser::parse(&payload).unwrap();
        assert_eq!(ResponseParser::parse(&fenced).unwrap(), plain);
        assert_eq!(ResponseParser::parse(&bare_fence).unwrap(), plain);
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(ResponseParser::strip_fences("```json\n{}\n```"), "{}");
        assert_eq!(ResponseParser::strip_fences("```JSON {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(ResponseParser::strip_fences("  {}  "), "{}");
    }

    #[test]
    fn test_malformed_response() {
        let err = ResponseParser::parse("here are your questions: {").unwrap_err();
        assert!(matches!(err, ParseError::MalformedResponse { .. }));
    }

    #[test]
    fn test_missing_questions_field() {
        let err = ResponseParser::parse(r#"{"items": []}"#).unwrap_err();
        assert_eq!(schema_field(err), (None, "questions".to_string()));

        let err = ResponseParser::parse(r#"{"questions": {}}"#).unwrap_err();
        assert_eq!(schema_field(err), (None, "questions".to_string()));
    }

    #[test]
    fn test_missing_answers_names_field_and_position() {
        let raw = r#"{"questions":[
            {"question":"Q1","answers":["a","b"],"correct_answer_index":0},
            {"question":"Q2","correct_answer_index":0}
        ]}"#;
        let err = ResponseParser::parse(raw).unwrap_err();
        assert_eq!(schema_field(err), (Some(2), "answers".to_string()));
    }

    #[test]
    fn test_wrong_types() {
        let raw = r#"{"questions":[{"question":42,"answers":["a","b"],"correct_answer_index":0}]}"#;
        assert_eq!(
            schema_field(ResponseParser::parse(raw).unwrap_err()),
            (Some(1), "question".to_string())
        );

        let raw = r#"{"questions":[{"question":"Q","answers":["a",1],"correct_answer_index":0}]}"#;
        assert_eq!(
            schema_field(ResponseParser::parse(raw).unwrap_err()),
            (Some(1), "answers".to_string())
        );

        let raw = r#"{"questions":[{"question":"Q","answers":["a","b"],"correct_answer_index":"0"}]}"#;
        assert_eq!(
            schema_field(ResponseParser::parse(raw).unwrap_err()),
            (Some(1), "correct_answer_index".to_string())
        );

        let raw = r#"{"questions":[{"question":"Q","answers":["a","b"],"correct_answer_index":0,"explanation":7}]}"#;
        assert_eq!(
            schema_field(ResponseParser::parse(raw).unwrap_err()),
            (Some(1), "explanation".to_string())
        );
    }

    #[test]
    fn test_too_few_answers() {
        let raw = r#"{"questions":[{"question":"Q","answers":["only"],"correct_answer_index":0}]}"#;
        assert_eq!(
            schema_field(ResponseParser::parse(raw).unwrap_err()),
            (Some(1), "answers".to_string())
        );
    }

    #[test]
    fn test_correct_index_boundaries() {
        let at_len = r#"{"questions":[{"question":"Q","answers":["a","b","c"],"correct_answer_index":3}]}"#;
        assert_eq!(
            schema_field(ResponseParser::parse(at_len).unwrap_err()),
            (Some(1), "correct_answer_index".to_string())
        );

        let negative = r#"{"questions":[{"question":"Q","answers":["a","b","c"],"correct_answer_index":-1}]}"#;
        assert_eq!(
            schema_field(ResponseParser::parse(negative).unwrap_err()),
            (Some(1), "correct_answer_index".to_string())
        );

        let last = r#"{"questions":[{"question":"Q","answers":["a","b","c"],"correct_answer_index":2}]}"#;
        assert_eq!(ResponseParser::parse(last).unwrap()[0].correct_answer, 2);
    }

    #[test]
    fn test_null_explanation_is_absent() {
        let raw = r#"{"questions":[{"question":"Q","answers":["a","b"],"correct_answer_index":1,"explanation":null}]}"#;
        assert_eq!(ResponseParser::parse(raw).unwrap()[0].explanation, None);
    }

    #[test]
    fn test_empty_question_list() {
        assert!(ResponseParser::parse(r#"{"questions": []}"#).unwrap().is_empty());
    }
}
