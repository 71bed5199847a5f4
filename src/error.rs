use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 题目生成流程错误
    #[error("题目生成失败: {0}")]
    Pipeline(#[from] PipelineError),
    /// 导出错误
    #[error("导出失败: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 试卷文件读写错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 错误类别，用于调用方按类别处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RemoteGenerationFailure,
    MalformedResponse,
    SchemaViolation,
    InvalidRequest,
}

/// 题目生成流程错误
///
/// 远程调用和解析的错误都包装在这里，原始错误通过 `source()` 保留
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 请求参数不合法
    #[error("请求参数不合法: {reason}")]
    InvalidRequest { reason: String },
    /// 远程生成失败
    #[error("远程生成失败: {0}")]
    Remote(#[source] RemoteError),
    /// 返回内容解析失败
    #[error("返回内容解析失败: {0}")]
    Parse(#[source] ParseError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            PipelineError::Remote(_) => ErrorKind::RemoteGenerationFailure,
            PipelineError::Parse(ParseError::MalformedResponse { .. }) => {
                ErrorKind::MalformedResponse
            }
            PipelineError::Parse(ParseError::SchemaViolation { .. }) => ErrorKind::SchemaViolation,
        }
    }
}

impl From<RemoteError> for PipelineError {
    fn from(err: RemoteError) -> Self {
        PipelineError::Remote(err)
    }
}

impl From<ParseError> for PipelineError {
    fn from(err: ParseError) -> Self {
        PipelineError::Parse(err)
    }
}

/// 远程生成服务错误
#[derive(Debug, Error)]
pub enum RemoteError {
    /// 请求发送失败（网络不可达等）
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回非成功状态码
    #[error("服务返回错误状态 ({endpoint}): {status} {body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 服务返回内容无法识别
    #[error("无法识别的服务响应 ({endpoint}): {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },
    /// 运行以失败状态结束
    #[error("运行 {run_id} 以状态 {status} 结束: {}", .reason.as_deref().unwrap_or("无错误信息"))]
    RunFailed {
        run_id: String,
        status: String,
        reason: Option<String>,
    },
    /// 轮询次数用尽，运行仍未结束
    #[error("运行 {run_id} 在 {attempts} 次轮询后仍未完成")]
    PollExhausted { run_id: String, attempts: u32 },
    /// 返回内容为空
    #[error("模型返回内容为空 (后端: {backend})")]
    EmptyResponse { backend: String },
    /// 后端不支持附件
    #[error("后端 {backend} 不支持附件")]
    AttachmentUnsupported { backend: String },
    /// Chat Completions 接口调用失败
    #[error("LLM API 调用失败 (模型: {model}): {source}")]
    Llm {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
}

/// 返回内容解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 内容不是合法的 JSON
    #[error("返回内容不是合法的 JSON: {source}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
    },
    /// JSON 结构不符合约定
    #[error("{}字段 `{field}` 不合法: {reason}", .position.map(|p| format!("第 {} 题的", p)).unwrap_or_default())]
    SchemaViolation {
        /// 题目位置（从1开始），顶层字段为 None
        position: Option<usize>,
        field: String,
        reason: String,
    },
}

impl ParseError {
    pub fn schema(position: Option<usize>, field: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::SchemaViolation {
            position,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 转换程序无法启动
    #[error("无法启动转换程序 {program}: {source}")]
    ConverterSpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// 转换程序退出码非 0
    #[error("转换程序 {program} 执行失败 ({status}): {stderr}")]
    ConverterFailed {
        program: String,
        status: String,
        stderr: String,
    },
    /// 临时文件或输出文件读写失败
    #[error("文件操作失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 在线测验服务请求失败
    #[error("在线测验服务请求失败 ({endpoint}): {source}")]
    QuizRequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 在线测验服务返回错误状态
    #[error("在线测验服务返回错误状态 ({endpoint}): {status} {body}")]
    QuizServiceStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 在线测验服务返回内容缺少字段
    #[error("在线测验服务响应缺少字段 `{field}`")]
    MissingField { field: String },
    /// 没有可导出的题目
    #[error("没有可导出的题目")]
    EmptyExam,
    /// 试卷文件中的正确答案下标越界
    #[error("题目 {id} 的正确答案下标 {index} 超出范围 [0, {count})")]
    InvalidAnswer { id: usize, index: usize, count: usize },
}

/// 试卷文件错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON 处理失败 ({path}): {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("TOML 解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("TOML 序列化失败 ({path}): {source}")]
    TomlSerializeFailed {
        path: String,
        #[source]
        source: toml::ser::Error,
    },
    #[error("不支持的文件格式: {path}")]
    UnsupportedFormat { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少必需的配置项
    #[error("缺少配置项 {name}")]
    MissingValue { name: String },
    /// 配置项取值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    InvalidValue { name: String, reason: String },
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl RemoteError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        RemoteError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建无法识别响应错误
    pub fn unexpected(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        RemoteError::UnexpectedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

impl ExportError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_pipeline_error_kind() {
        let err = PipelineError::from(ParseError::schema(Some(2), "answers", "缺失"));
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);

        let err = PipelineError::from(RemoteError::EmptyResponse {
            backend: "chat".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::RemoteGenerationFailure);

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = PipelineError::from(ParseError::MalformedResponse { source: json_err });
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_pipeline_error_keeps_cause() {
        let err = PipelineError::from(RemoteError::PollExhausted {
            run_id: "run_1".to_string(),
            attempts: 3,
        });
        let source = err.source().expect("应保留原始错误");
        assert!(source.to_string().contains("run_1"));
    }

    #[test]
    fn test_schema_violation_message_names_field_and_position() {
        let err = ParseError::schema(Some(3), "correct_answer_index", "超出范围");
        let msg = err.to_string();
        assert!(msg.contains("第 3 题"));
        assert!(msg.contains("correct_answer_index"));

        let err = ParseError::schema(None, "questions", "缺失");
        assert!(!err.to_string().contains("第"));
    }
}
