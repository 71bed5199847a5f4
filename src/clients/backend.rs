//! 生成后端抽象
//!
//! 流程层只依赖"上传附件 → 提交 → 轮询 → 取回文本 → 释放附件"这一组能力，
//! 不关心后端的具体协议

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::models::Attachment;

/// 已上传的附件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub id: String,
    pub file_name: String,
}

/// 一次已提交的生成任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub thread_id: String,
    pub run_id: String,
}

/// 生成任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// 仍在排队或执行中
    Pending(String),
    Completed,
    /// 以非成功状态结束
    Failed {
        status: String,
        reason: Option<String>,
    },
}

impl RunStatus {
    /// 按 Assistants 接口的状态字符串转换
    ///
    /// `requires_action` 需要调用方提交工具输出，这里没有工具可提供，按失败处理
    pub fn from_api(status: &str, reason: Option<String>) -> Self {
        match status {
            "queued" | "in_progress" | "cancelling" => RunStatus::Pending(status.to_string()),
            "completed" => RunStatus::Completed,
            other => RunStatus::Failed {
                status: other.to_string(),
                reason,
            },
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RunStatus::Pending(_))
    }
}

/// 生成后端
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// 后端名称（用于日志）
    fn name(&self) -> &str;

    /// 上传附件
    async fn upload(&self, attachment: &Attachment) -> Result<FileHandle, RemoteError>;

    /// 删除已上传的附件
    async fn release(&self, file: &FileHandle) -> Result<(), RemoteError>;

    /// 提交提示词和附件，返回任务句柄
    async fn submit(&self, prompt: &str, files: &[FileHandle]) -> Result<RunHandle, RemoteError>;

    /// 查询任务状态
    async fn status(&self, run: &RunHandle) -> Result<RunStatus, RemoteError>;

    /// 取回已完成任务的文本
    async fn fetch(&self, run: &RunHandle) -> Result<String, RemoteError>;
}
