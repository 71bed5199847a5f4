//! PDF 转换器 - 基础设施层
//!
//! 持有外部转换程序的调用方式，只暴露"Markdown → PDF"的能力

use std::io::Write;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ExportError;

/// PDF 转换器
///
/// 职责：
/// - 把 Markdown 写入临时文件
/// - 调用外部转换程序生成 PDF
/// - 无论成功失败都删除临时文件
/// - 不认识 Question
pub struct PdfConverter {
    program: String,
    footer: String,
    paper_size: String,
}

impl PdfConverter {
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.pdf_converter.clone(),
            footer: config.pdf_footer.clone(),
            paper_size: config.pdf_paper_size.clone(),
        }
    }

    /// 转换程序的参数
    fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            input.display().to_string(),
            "--output".to_string(),
            output.display().to_string(),
            "--footer".to_string(),
            self.footer.clone(),
            "--paper".to_string(),
            self.paper_size.clone(),
        ]
    }

    /// 把 Markdown 转换为 PDF 文件
    pub async fn convert(&self, markdown: &str, output: &Path) -> Result<(), ExportError> {
        // 临时文件在 drop 时删除
        let mut temp = tempfile::Builder::new()
            .prefix("exam-")
            .suffix(".md")
            .tempfile()
            .map_err(|e| ExportError::io("临时 Markdown 文件", e))?;
        let temp_path = temp.path().display().to_string();
        temp.write_all(markdown.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| ExportError::io(temp_path, e))?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ExportError::io(parent.display().to_string(), e))?;
        }

        let args = self.args(temp.path(), output);
        debug!("执行转换程序: {} {}", self.program, args.join(" "));

        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| ExportError::ConverterSpawnFailed {
                program: self.program.clone(),
                source: e,
            })?;

        if !result.status.success() {
            return Err(ExportError::ConverterFailed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        info!("✓ PDF 已生成: {}", output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_follow_converter_invocation() {
        let converter = PdfConverter::new(&Config::default());
        let args = converter.args(Path::new("in.md"), Path::new("out.pdf"));
        assert_eq!(
            args,
            vec!["in.md", "--output", "out.pdf", "--footer", ",,{page}", "--paper", "A4"]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let config = Config {
            pdf_converter: "definitely-not-a-real-converter".to_string(),
            ..Config::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let result = PdfConverter::new(&config)
            .convert("**1. Q**", &dir.path().join("out.pdf"))
            .await;
        assert!(matches!(
            result,
            Err(ExportError::ConverterSpawnFailed { .. })
        ));
    }

    /// 写一个记录输入文件路径的转换脚本
    #[cfg(unix)]
    fn recording_converter(dir: &Path, exit_code: i32) -> (Config, std::path::PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let record = dir.join("input-path.txt");
        let script = dir.join("fake-converter.sh");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nprintf '%s' \"$1\" > '{}'\nexit {}\n",
                record.display(),
                exit_code
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = Config {
            pdf_converter: script.display().to_string(),
            ..Config::default()
        };
        (config, record)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_temp_markdown_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let (config, record) = recording_converter(dir.path(), 0);

        PdfConverter::new(&config)
            .convert("**1. Q**", &dir.path().join("out.pdf"))
            .await
            .unwrap();

        let input = std::fs::read_to_string(&record).unwrap();
        assert!(input.ends_with(".md"));
        assert!(!Path::new(&input).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_temp_markdown_removed_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (config, record) = recording_converter(dir.path(), 1);

        let result = PdfConverter::new(&config)
            .convert("**1. Q**", &dir.path().join("out.pdf"))
            .await;
        assert!(matches!(result, Err(ExportError::ConverterFailed { .. })));

        let input = std::fs::read_to_string(&record).unwrap();
        assert!(input.ends_with(".md"));
        assert!(!Path::new(&input).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program_is_converter_error() {
        let config = Config {
            pdf_converter: "false".to_string(),
            ..Config::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let result = PdfConverter::new(&config)
            .convert("**1. Q**", &dir.path().join("out.pdf"))
            .await;
        assert!(matches!(result, Err(ExportError::ConverterFailed { .. })));
    }
}
