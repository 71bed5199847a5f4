use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// 生成后端类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Assistants 接口（线程 + 运行 + 轮询，支持附件）
    Assistant,
    /// Chat Completions 接口（单次请求，不支持附件）
    Chat,
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assistant" => Ok(BackendKind::Assistant),
            "chat" => Ok(BackendKind::Chat),
            other => Err(ConfigError::EnvVarParseFailed {
                var_name: "GENERATION_BACKEND".to_string(),
                value: other.to_string(),
                expected_type: "assistant | chat".to_string(),
            }),
        }
    }
}

/// 程序配置
///
/// 凭据只作为普通配置值传入各个客户端的构造函数，不保存在全局状态里
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// Assistants 接口使用的助手 ID
    pub assistant_id: String,
    pub backend: BackendKind,
    /// 轮询运行状态的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 最多轮询次数
    pub max_poll_attempts: u32,
    // --- 文档导出 ---
    pub pdf_converter: String,
    pub pdf_footer: String,
    pub pdf_paper_size: String,
    // --- 在线测验 ---
    pub forms_api_base_url: String,
    pub drive_api_base_url: String,
    pub google_access_token: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 导出文件目录
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            assistant_id: String::new(),
            backend: BackendKind::Assistant,
            poll_interval_ms: 1000,
            max_poll_attempts: 300,
            pdf_converter: "mdpdf".to_string(),
            pdf_footer: ",,{page}".to_string(),
            pdf_paper_size: "A4".to_string(),
            forms_api_base_url: "https://forms.googleapis.com/v1".to_string(),
            drive_api_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            google_access_token: String::new(),
            verbose_logging: false,
            output_dir: "output".to_string(),
        }
    }
}

/// TOML 配置文件，所有字段可选，只覆盖出现的字段
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    llm_api_key: Option<String>,
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
    assistant_id: Option<String>,
    backend: Option<BackendKind>,
    poll_interval_ms: Option<u64>,
    max_poll_attempts: Option<u32>,
    pdf_converter: Option<String>,
    pdf_footer: Option<String>,
    pdf_paper_size: Option<String>,
    forms_api_base_url: Option<String>,
    drive_api_base_url: Option<String>,
    google_access_token: Option<String>,
    verbose_logging: Option<bool>,
    output_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 用环境变量覆盖当前配置，解析失败的值保持原样
    pub fn with_env(self) -> Self {
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            assistant_id: std::env::var("ASSISTANT_ID").unwrap_or(self.assistant_id),
            backend: std::env::var("GENERATION_BACKEND").ok().and_then(|v| v.parse().ok()).unwrap_or(self.backend),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.poll_interval_ms),
            max_poll_attempts: std::env::var("MAX_POLL_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_poll_attempts),
            pdf_converter: std::env::var("PDF_CONVERTER").unwrap_or(self.pdf_converter),
            pdf_footer: std::env::var("PDF_FOOTER").unwrap_or(self.pdf_footer),
            pdf_paper_size: std::env::var("PDF_PAPER_SIZE").unwrap_or(self.pdf_paper_size),
            forms_api_base_url: std::env::var("FORMS_API_BASE_URL").unwrap_or(self.forms_api_base_url),
            drive_api_base_url: std::env::var("DRIVE_API_BASE_URL").unwrap_or(self.drive_api_base_url),
            google_access_token: std::env::var("GOOGLE_ACCESS_TOKEN").unwrap_or(self.google_access_token),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
        }
    }

    /// 从 TOML 文件加载配置（未出现的字段使用默认值）
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
            path: String::new(),
            source: e,
        })?;
        let default = Self::default();
        Ok(Self {
            llm_api_key: file.llm_api_key.unwrap_or(default.llm_api_key),
            llm_api_base_url: file.llm_api_base_url.unwrap_or(default.llm_api_base_url),
            llm_model_name: file.llm_model_name.unwrap_or(default.llm_model_name),
            assistant_id: file.assistant_id.unwrap_or(default.assistant_id),
            backend: file.backend.unwrap_or(default.backend),
            poll_interval_ms: file.poll_interval_ms.unwrap_or(default.poll_interval_ms),
            max_poll_attempts: file.max_poll_attempts.unwrap_or(default.max_poll_attempts),
            pdf_converter: file.pdf_converter.unwrap_or(default.pdf_converter),
            pdf_footer: file.pdf_footer.unwrap_or(default.pdf_footer),
            pdf_paper_size: file.pdf_paper_size.unwrap_or(default.pdf_paper_size),
            forms_api_base_url: file.forms_api_base_url.unwrap_or(default.forms_api_base_url),
            drive_api_base_url: file.drive_api_base_url.unwrap_or(default.drive_api_base_url),
            google_access_token: file.google_access_token.unwrap_or(default.google_access_token),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
            output_dir: file.output_dir.unwrap_or(default.output_dir),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 检查生成题目所需的配置
    pub fn validate_for_generation(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingValue {
                name: "LLM_API_KEY".to_string(),
            });
        }
        if self.backend == BackendKind::Assistant && self.assistant_id.trim().is_empty() {
            return Err(ConfigError::MissingValue {
                name: "ASSISTANT_ID".to_string(),
            });
        }
        if self.max_poll_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_POLL_ATTEMPTS".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 检查导出在线测验所需的配置
    pub fn validate_for_forms(&self) -> Result<(), ConfigError> {
        if self.google_access_token.trim().is_empty() {
            return Err(ConfigError::MissingValue {
                name: "GOOGLE_ACCESS_TOKEN".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_converter_invocation() {
        let config = Config::default();
        assert_eq!(config.pdf_converter, "mdpdf");
        assert_eq!(config.pdf_footer, ",,{page}");
        assert_eq!(config.pdf_paper_size, "A4");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_toml_overrides_only_given_fields() {
        let config = Config::from_toml_str(
            r#"
            llm_model_name = "gpt-4o-mini"
            backend = "chat"
            max_poll_attempts = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.llm_model_name, "gpt-4o-mini");
        assert_eq!(config.backend, BackendKind::Chat);
        assert_eq!(config.max_poll_attempts, 10);
        assert_eq!(config.pdf_paper_size, "A4");
    }

    #[test]
    fn test_toml_rejects_unknown_backend() {
        let result = Config::from_toml_str(r#"backend = "grpc""#);
        assert!(matches!(result, Err(ConfigError::TomlParseFailed { .. })));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Assistant".parse::<BackendKind>().unwrap(), BackendKind::Assistant);
        assert_eq!(" chat ".parse::<BackendKind>().unwrap(), BackendKind::Chat);
        assert!("other".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_validate_for_generation_requires_key_and_assistant() {
        let mut config = Config::default();
        assert!(matches!(
            config.validate_for_generation(),
            Err(ConfigError::MissingValue { .. })
        ));

        config.llm_api_key = "sk-test".to_string();
        assert!(config.validate_for_generation().is_err());

        config.backend = BackendKind::Chat;
        assert!(config.validate_for_generation().is_ok());
    }
}
