//! Assistants API 客户端
//!
//! 封装文件上传、线程、运行和消息相关的 HTTP 调用
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::clients::backend::{FileHandle, GenerationBackend, RunHandle, RunStatus};
use crate::config::Config;
use crate::error::RemoteError;
use crate::models::Attachment;

const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VALUE: &str = "assistants=v2";

/// Assistants 客户端
pub struct AssistantClient {
    http: Client,
    api_key: String,
    api_base_url: String,
    assistant_id: String,
}

impl AssistantClient {
    /// 创建新的 Assistants 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            api_key: config.llm_api_key.clone(),
            api_base_url: config.llm_api_base_url.trim_end_matches('/').to_string(),
            assistant_id: config.assistant_id.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER, BETA_VALUE)
    }

    /// 发送请求并检查状态码，返回 JSON 响应体
    async fn send_json(&self, request: RequestBuilder, endpoint: &str) -> Result<JsonValue, RemoteError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| RemoteError::request_failed(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Assistants API 返回错误状态 {} ({})", status, endpoint);
            return Err(RemoteError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::request_failed(endpoint, e))
    }

    async fn create_thread(&self, prompt: &str, files: &[FileHandle]) -> Result<String, RemoteError> {
        let endpoint = self.url("threads");
        let body = thread_body(prompt, files);
        let response = self
            .send_json(self.http.post(&endpoint).json(&body), &endpoint)
            .await?;
        string_field(&response, "id", &endpoint)
    }
}

#[async_trait]
impl GenerationBackend for AssistantClient {
    fn name(&self) -> &str {
        "assistant"
    }

    async fn upload(&self, attachment: &Attachment) -> Result<FileHandle, RemoteError> {
        let endpoint = self.url("files");
        debug!(
            "上传附件 {} ({} 字节)",
            attachment.file_name,
            attachment.bytes.len()
        );

        let part = Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
        let form = Form::new().text("purpose", "assistants").part("file", part);

        let response = self
            .send_json(self.http.post(&endpoint).multipart(form), &endpoint)
            .await?;

        Ok(FileHandle {
            id: string_field(&response, "id", &endpoint)?,
            file_name: attachment.file_name.clone(),
        })
    }

    async fn release(&self, file: &FileHandle) -> Result<(), RemoteError> {
        let endpoint = self.url(&format!("files/{}", file.id));
        self.send_json(self.http.delete(&endpoint), &endpoint).await?;
        debug!("已删除附件 {} ({})", file.file_name, file.id);
        Ok(())
    }

    async fn submit(&self, prompt: &str, files: &[FileHandle]) -> Result<RunHandle, RemoteError> {
        let thread_id = self.create_thread(prompt, files).await?;

        let endpoint = self.url(&format!("threads/{}/runs", thread_id));
        let body = json!({ "assistant_id": self.assistant_id });
        let response = self
            .send_json(self.http.post(&endpoint).json(&body), &endpoint)
            .await?;

        let run_id = string_field(&response, "id", &endpoint)?;
        debug!("已创建运行 {} (线程 {})", run_id, thread_id);
        Ok(RunHandle { thread_id, run_id })
    }

    async fn status(&self, run: &RunHandle) -> Result<RunStatus, RemoteError> {
        let endpoint = self.url(&format!("threads/{}/runs/{}", run.thread_id, run.run_id));
        let response = self.send_json(self.http.get(&endpoint), &endpoint).await?;
        let status = string_field(&response, "status", &endpoint)?;
        let reason = response
            .get("last_error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string);
        Ok(RunStatus::from_api(&status, reason))
    }

    async fn fetch(&self, run: &RunHandle) -> Result<String, RemoteError> {
        let endpoint = self.url(&format!("threads/{}/messages", run.thread_id));
        let request = self
            .http
            .get(&endpoint)
            .query(&[("order", "desc"), ("limit", "1"), ("run_id", run.run_id.as_str())]);
        let response = self.send_json(request, &endpoint).await?;

        extract_message_text(&response).ok_or_else(|| RemoteError::EmptyResponse {
            backend: self.name().to_string(),
        })
    }
}

/// 构建创建线程的请求体，附件交给 file_search 工具
fn thread_body(prompt: &str, files: &[FileHandle]) -> JsonValue {
    let attachments: Vec<JsonValue> = files
        .iter()
        .map(|f| json!({ "file_id": f.id, "tools": [{ "type": "file_search" }] }))
        .collect();

    json!({
        "messages": [{
            "role": "user",
            "content": prompt,
            "attachments": attachments,
        }]
    })
}

/// 取出最新一条消息中的第一段文本
fn extract_message_text(body: &JsonValue) -> Option<String> {
    body.get("data")?
        .as_array()?
        .first()?
        .get("content")?
        .as_array()?
        .iter()
        .filter(|part| part.get("type").and_then(|t| t.as_str()) == Some("text"))
        .find_map(|part| part.get("text")?.get("value")?.as_str())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn string_field(body: &JsonValue, field: &str, endpoint: &str) -> Result<String, RemoteError> {
    body.get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| RemoteError::unexpected(endpoint, format!("缺少字段 `{}`", field)))
}
