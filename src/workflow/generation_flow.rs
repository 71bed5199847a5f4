//! 题目生成流程 - 流程层
//!
//! 核心职责：定义"一次生成"的完整流程
//!
//! 流程顺序：
//! 1. 构建提示词
//! 2. 上传附件 → 提交 → 轮询直到结束 → 取回文本
//! 3. 解析为题目列表
//! 4. 释放附件（无论成功失败，流程被中途丢弃时也会在后台释放）
//!
//! 只尝试一次，任何一步失败整批失败，不返回部分结果

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clients::{
    AssistantClient, ChatClient, FileHandle, GenerationBackend, RunHandle, RunStatus,
};
use crate::config::{BackendKind, Config};
use crate::error::{PipelineError, RemoteError};
use crate::models::{Attachment, ExamRequest, Question};
use crate::services::{PromptBuilder, ResponseParser};
use crate::utils::logging::truncate_text;

/// 题目生成流程
///
/// - 编排提示词、远程生成和解析
/// - 每次调用相互独立，不保存跨调用的状态
/// - 只依赖 `GenerationBackend` 能力，不关心后端协议
pub struct QuestionGenerationPipeline {
    backend: Arc<dyn GenerationBackend>,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl QuestionGenerationPipeline {
    /// 按配置选择后端并创建流程
    pub fn from_config(config: &Config) -> Self {
        let backend: Arc<dyn GenerationBackend> = match config.backend {
            BackendKind::Assistant => Arc::new(AssistantClient::new(config)),
            BackendKind::Chat => Arc::new(ChatClient::new(config)),
        };
        Self::new(backend, config.poll_interval(), config.max_poll_attempts)
    }

    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        poll_interval: Duration,
        max_poll_attempts: u32,
    ) -> Self {
        Self {
            backend,
            poll_interval,
            max_poll_attempts,
        }
    }

    /// 生成题目
    ///
    /// # 参数
    /// - `topics`: 试卷主题
    /// - `question_count`: 题目数量（大于 0）
    /// - `answer_count`: 每题选项数量（不少于 2）
    /// - `attachments`: 附件，生成时供模型参考
    pub async fn generate(
        &self,
        topics: &str,
        question_count: usize,
        answer_count: usize,
        attachments: &[Attachment],
    ) -> Result<Vec<Question>, PipelineError> {
        let request = ExamRequest::new(topics, question_count, answer_count)
            .map_err(|reason| PipelineError::InvalidRequest { reason })?;
        self.generate_for(&request, attachments).await
    }

    /// 按已校验的请求生成题目
    pub async fn generate_for(
        &self,
        request: &ExamRequest,
        attachments: &[Attachment],
    ) -> Result<Vec<Question>, PipelineError> {
        info!(
            "🤖 开始生成试卷: 主题 \"{}\"，{} 题，每题 {} 个选项 (后端: {})",
            truncate_text(&request.topics, 60),
            request.question_count,
            request.answer_count,
            self.backend.name()
        );

        let prompt = PromptBuilder::for_request(request);
        debug!("提示词: {}", prompt);

        let mut uploaded = UploadGuard::new(self.backend.clone());
        let outcome = match self.upload_all(attachments, &mut uploaded).await {
            Ok(()) => self.run_and_parse(&prompt, &uploaded.files).await,
            Err(e) => Err(PipelineError::Remote(e)),
        };

        // 附件在任何结果下都要释放
        self.release_all(&mut uploaded).await;

        match &outcome {
            Ok(questions) => {
                info!("✓ 生成完成，共 {} 个题目", questions.len());
                if questions.len() != request.question_count {
                    warn!(
                        "⚠️ 请求 {} 个题目，实际返回 {} 个",
                        request.question_count,
                        questions.len()
                    );
                }
            }
            Err(e) => warn!("❌ 生成失败: {}", e),
        }
        outcome
    }

    /// 依次上传附件，已上传的句柄写入 `uploaded`，便于失败后释放
    async fn upload_all(
        &self,
        attachments: &[Attachment],
        uploaded: &mut UploadGuard,
    ) -> Result<(), RemoteError> {
        for attachment in attachments {
            let handle = self.backend.upload(attachment).await?;
            debug!("✓ 已上传附件 {} → {}", attachment.file_name, handle.id);
            uploaded.files.push(handle);
        }
        Ok(())
    }

    async fn run_and_parse(
        &self,
        prompt: &str,
        files: &[FileHandle],
    ) -> Result<Vec<Question>, PipelineError> {
        let run = self.backend.submit(prompt, files).await?;
        self.wait_for_completion(&run).await?;

        let response = self.backend.fetch(&run).await?;
        debug!("模型返回: {}", truncate_text(&response, 500));

        Ok(ResponseParser::parse(&response)?)
    }

    /// 以固定间隔轮询，直到运行结束或次数用尽
    async fn wait_for_completion(&self, run: &RunHandle) -> Result<(), RemoteError> {
        for attempt in 1..=self.max_poll_attempts {
            match self.backend.status(run).await? {
                RunStatus::Completed => {
                    debug!("运行 {} 在第 {} 次轮询时完成", run.run_id, attempt);
                    return Ok(());
                }
                RunStatus::Failed { status, reason } => {
                    return Err(RemoteError::RunFailed {
                        run_id: run.run_id.clone(),
                        status,
                        reason,
                    });
                }
                RunStatus::Pending(status) => {
                    debug!("运行 {} 状态: {} ({}/{})", run.run_id, status, attempt, self.max_poll_attempts);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        Err(RemoteError::PollExhausted {
            run_id: run.run_id.clone(),
            attempts: self.max_poll_attempts,
        })
    }

    /// 释放附件，失败只记录警告，不覆盖主流程的结果
    ///
    /// 每个附件处理完才从守卫中移除，中途被丢弃时剩下的交给守卫
    async fn release_all(&self, uploaded: &mut UploadGuard) {
        while let Some(file) = uploaded.files.first().cloned() {
            release_file(self.backend.as_ref(), &file).await;
            uploaded.files.remove(0);
        }
    }
}

async fn release_file(backend: &dyn GenerationBackend, file: &FileHandle) {
    if let Err(e) = backend.release(file).await {
        warn!("⚠️ 删除附件 {} ({}) 失败: {}", file.file_name, file.id, e);
    }
}

/// 尚未释放的附件
///
/// 流程 future 在释放前被丢弃（例如调用方的超时）时，在后台任务中删除剩下的附件
struct UploadGuard {
    backend: Arc<dyn GenerationBackend>,
    files: Vec<FileHandle>,
}

impl UploadGuard {
    fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            files: Vec::new(),
        }
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if self.files.is_empty() {
            return;
        }

        let files = std::mem::take(&mut self.files);
        let backend = self.backend.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("⚠️ 生成被中断，后台删除 {} 个附件", files.len());
                handle.spawn(async move {
                    for file in &files {
                        release_file(backend.as_ref(), file).await;
                    }
                });
            }
            Err(_) => {
                for file in &files {
                    warn!("⚠️ 没有可用的运行时，附件 {} ({}) 未删除", file.file_name, file.id);
                }
            }
        }
    }
}
