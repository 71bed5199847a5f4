use crate::error::FileError;
use crate::models::exam::Exam;
use std::path::Path;
use tokio::fs;

/// 试卷文件格式，按扩展名判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExamFormat {
    Json,
    Toml,
}

fn detect_format(path: &Path) -> Result<ExamFormat, FileError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("json") => Ok(ExamFormat::Json),
        Some("toml") => Ok(ExamFormat::Toml),
        _ => Err(FileError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// 从 JSON 或 TOML 文件加载试卷
pub async fn load_exam(path: &Path) -> Result<Exam, FileError> {
    let format = detect_format(path)?;
    let path_str = path.display().to_string();

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| FileError::ReadFailed {
            path: path_str.clone(),
            source: e,
        })?;

    let exam: Exam = match format {
        ExamFormat::Json => serde_json::from_str(&content).map_err(|e| FileError::Json {
            path: path_str.clone(),
            source: e,
        })?,
        ExamFormat::Toml => toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
            path: path_str.clone(),
            source: e,
        })?,
    };

    tracing::info!("成功加载试卷 {}，共 {} 个题目", path_str, exam.questions.len());
    Ok(exam)
}

/// 保存试卷，父目录不存在时自动创建
pub async fn save_exam(path: &Path, exam: &Exam) -> Result<(), FileError> {
    let format = detect_format(path)?;
    let path_str = path.display().to_string();

    let content = match format {
        ExamFormat::Json => serde_json::to_string_pretty(exam).map_err(|e| FileError::Json {
            path: path_str.clone(),
            source: e,
        })?,
        ExamFormat::Toml => toml::to_string_pretty(exam).map_err(|e| FileError::TomlSerializeFailed {
            path: path_str.clone(),
            source: e,
        })?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| FileError::WriteFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
    }

    fs::write(path, content)
        .await
        .map_err(|e| FileError::WriteFailed {
            path: path_str.clone(),
            source: e,
        })?;

    tracing::info!("试卷已保存至: {}", path_str);
    Ok(())
}
