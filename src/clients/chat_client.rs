//! Chat Completions 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务
//!
//! 单次请求即返回结果，`submit` 时直接完成调用，`status` 总是返回完成

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::clients::backend::{FileHandle, GenerationBackend, RunHandle, RunStatus};
use crate::config::Config;
use crate::error::RemoteError;
use crate::models::Attachment;

const SYSTEM_MESSAGE: &str =
    "You are an exam author. You answer only with a single JSON object and no other text.";

/// Chat Completions 客户端
pub struct ChatClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    next_run: AtomicU64,
    /// 已完成但尚未取回的结果
    completed: Mutex<HashMap<String, String>>,
}

impl ChatClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            next_run: AtomicU64::new(1),
            completed: Mutex::new(HashMap::new()),
        }
    }

    fn llm_error(&self, source: async_openai::error::OpenAIError) -> RemoteError {
        RemoteError::Llm {
            model: self.model_name.clone(),
            source,
        }
    }

    /// 发送一次聊天请求，返回模型的文本回复
    pub async fn send_to_llm(&self, user_message: &str, system_message: Option<&str>) -> Result<String, RemoteError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| self.llm_error(e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| self.llm_error(e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .build()
            .map_err(|e| self.llm_error(e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            self.llm_error(e)
        })?;

        debug!("LLM API 调用成功");

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| RemoteError::EmptyResponse {
                backend: self.name().to_string(),
            })
    }
}

#[async_trait]
impl GenerationBackend for ChatClient {
    fn name(&self) -> &str {
        "chat"
    }

    async fn upload(&self, _attachment: &Attachment) -> Result<FileHandle, RemoteError> {
        Err(RemoteError::AttachmentUnsupported {
            backend: self.name().to_string(),
        })
    }

    async fn release(&self, _file: &FileHandle) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn submit(&self, prompt: &str, files: &[FileHandle]) -> Result<RunHandle, RemoteError> {
        if !files.is_empty() {
            return Err(RemoteError::AttachmentUnsupported {
                backend: self.name().to_string(),
            });
        }

        let content = self.send_to_llm(prompt, Some(SYSTEM_MESSAGE)).await?;

        let run_id = format!("chat-{}", self.next_run.fetch_add(1, Ordering::Relaxed));
        self.completed.lock().await.insert(run_id.clone(), content);

        Ok(RunHandle {
            thread_id: String::new(),
            run_id,
        })
    }

    async fn status(&self, run: &RunHandle) -> Result<RunStatus, RemoteError> {
        if self.completed.lock().await.contains_key(&run.run_id) {
            Ok(RunStatus::Completed)
        } else {
            Ok(RunStatus::Failed {
                status: "unknown".to_string(),
                reason: Some(format!("没有运行 {} 的结果", run.run_id)),
            })
        }
    }

    async fn fetch(&self, run: &RunHandle) -> Result<String, RemoteError> {
        self.completed
            .lock()
            .await
            .remove(&run.run_id)
            .ok_or_else(|| RemoteError::EmptyResponse {
                backend: self.name().to_string(),
            })
    }
}
