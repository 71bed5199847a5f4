//! 在线测验客户端
//!
//! 调用表单接口创建测验，并通过云盘接口把编辑权限授予出卷人

use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ExportError;
use crate::models::Question;
use crate::services::quiz_form::QuizFormBuilder;

/// 在线测验客户端
pub struct FormsClient {
    http: Client,
    forms_api_base_url: String,
    drive_api_base_url: String,
    access_token: String,
}

impl FormsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            forms_api_base_url: config.forms_api_base_url.trim_end_matches('/').to_string(),
            drive_api_base_url: config.drive_api_base_url.trim_end_matches('/').to_string(),
            access_token: config.google_access_token.clone(),
        }
    }

    /// 创建测验并返回编辑地址
    ///
    /// 授权失败只记录警告；中途失败时已创建的表单不会回滚
    pub async fn export_quiz(
        &self,
        title: &str,
        questions: &[Question],
        owner_email: &str,
    ) -> Result<String, ExportError> {
        if questions.is_empty() {
            return Err(ExportError::EmptyExam);
        }
        // 先构建题目，答案不合法时不创建表单
        let items = QuizFormBuilder::create_items(questions)?;

        let endpoint = format!("{}/forms", self.forms_api_base_url);
        let created = self
            .post_json(&endpoint, &QuizFormBuilder::create_form(title))
            .await?;
        let form_id = created
            .get("formId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExportError::MissingField {
                field: "formId".to_string(),
            })?
            .to_string();
        info!("✓ 已创建表单 {}", form_id);

        let batch_endpoint = format!("{}/forms/{}:batchUpdate", self.forms_api_base_url, form_id);
        self.post_json(&batch_endpoint, &QuizFormBuilder::enable_quiz())
            .await?;
        debug!("已开启测验模式");

        self.post_json(&batch_endpoint, &items).await?;
        info!("✓ 已添加 {} 个题目", questions.len());

        if let Err(e) = self.grant_writer(&form_id, owner_email).await {
            warn!("⚠️ 表单已创建，但授权给 {} 失败: {}", owner_email, e);
        }

        Ok(QuizFormBuilder::edit_url(&form_id))
    }

    async fn grant_writer(&self, form_id: &str, email: &str) -> Result<(), ExportError> {
        let endpoint = format!("{}/files/{}/permissions", self.drive_api_base_url, form_id);
        self.post_json(&endpoint, &QuizFormBuilder::writer_permission(email))
            .await?;
        info!("✓ 已授予 {} 编辑权限", email);
        Ok(())
    }

    async fn post_json(&self, endpoint: &str, body: &JsonValue) -> Result<JsonValue, ExportError> {
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ExportError::QuizRequestFailed {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::QuizServiceStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ExportError::QuizRequestFailed {
                endpoint: endpoint.to_string(),
                source: e,
            })
    }
}
