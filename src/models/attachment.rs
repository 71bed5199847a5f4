use std::path::Path;

use crate::error::FileError;

/// 随请求上传的附件
///
/// 内容对流程不透明，只由生成后端上传和释放
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// 从磁盘读取附件
    pub async fn from_path(path: &Path) -> Result<Self, FileError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FileError::ReadFailed {
                path: path.display().to_string(),
                source: e,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self { file_name, bytes })
    }
}
