//! 文档导出服务 - 业务能力层
//!
//! 渲染 Markdown 并交给 PDF 转换器

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::ExportError;
use crate::infrastructure::PdfConverter;
use crate::models::{ExportMode, Question};
use crate::services::markdown_renderer::MarkdownRenderer;

/// 文档导出服务
pub struct DocumentExporter {
    converter: PdfConverter,
}

impl DocumentExporter {
    pub fn new(config: &Config) -> Self {
        Self {
            converter: PdfConverter::new(config),
        }
    }

    /// 导出 PDF
    pub async fn export_pdf(
        &self,
        questions: &[Question],
        mode: ExportMode,
        output: &Path,
    ) -> Result<(), ExportError> {
        if questions.is_empty() {
            return Err(ExportError::EmptyExam);
        }
        let markdown = MarkdownRenderer::render(questions, mode);
        self.converter.convert(&markdown, output).await
    }

    /// 只导出 Markdown，不调用转换程序
    pub async fn export_markdown(
        &self,
        questions: &[Question],
        mode: ExportMode,
        output: &Path,
    ) -> Result<(), ExportError> {
        if questions.is_empty() {
            return Err(ExportError::EmptyExam);
        }
        let markdown = MarkdownRenderer::render(questions, mode);

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ExportError::io(parent.display().to_string(), e))?;
        }
        tokio::fs::write(output, markdown)
            .await
            .map_err(|e| ExportError::io(output.display().to_string(), e))?;

        info!("✓ Markdown 已生成: {}", output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            id: 1,
            question: "Capital of France?".to_string(),
            answers: vec!["Lyon".to_string(), "Paris".to_string()],
            correct_answer: 1,
            explanation: Some("Paris is the capital.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_export_markdown_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("answers").join("exam.md");

        DocumentExporter::new(&Config::default())
            .export_markdown(&[question()], ExportMode::WithAnswers, &output)
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&output).await.unwrap();
        assert!(content.contains("- [X] Paris"));
    }

    #[tokio::test]
    async fn test_empty_exam_is_rejected() {
        let exporter = DocumentExporter::new(&Config::default());
        let result = exporter
            .export_pdf(&[], ExportMode::QuestionsOnly, Path::new("out.pdf"))
            .await;
        assert!(matches!(result, Err(ExportError::EmptyExam)));
    }
}
