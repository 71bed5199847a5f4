use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::cli::{Command, ExportFormArgs, ExportPdfArgs, GenerateArgs, ImportArgs};
use crate::clients::FormsClient;
use crate::config::{BackendKind, Config};
use crate::error::{AppResult, FileError, PipelineError};
use crate::models::{load_exam, save_exam, Attachment, Exam, ExportMode};
use crate::services::{DocumentExporter, LegacyTextParser};
use crate::utils::logging::{log_questions, log_startup, print_final_stats};
use crate::workflow::QuestionGenerationPipeline;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 执行子命令
    pub async fn run(&self, command: Command) -> Result<()> {
        let backend = match self.config.backend {
            BackendKind::Assistant => "assistant",
            BackendKind::Chat => "chat",
        };
        log_startup(command.name(), backend);

        let result = match command {
            Command::Generate(args) => self.generate(args).await,
            Command::ExportPdf(args) => self.export_pdf(args).await,
            Command::ExportForm(args) => self.export_form(args).await,
            Command::Import(args) => self.import(args).await,
        };
        Ok(result?)
    }

    async fn generate(&self, args: GenerateArgs) -> AppResult<()> {
        self.config.validate_for_generation()?;
        if args.form_owner.is_some() {
            self.config.validate_for_forms()?;
        }

        let mut attachments = Vec::with_capacity(args.attachments.len());
        for path in &args.attachments {
            attachments.push(Attachment::from_path(path).await?);
        }

        let pipeline = QuestionGenerationPipeline::from_config(&self.config);
        let questions = pipeline
            .generate(&args.topics, args.questions, args.answers, &attachments)
            .await?;

        if self.config.verbose_logging {
            log_questions(&questions);
        }

        let title = args.title.clone().unwrap_or_else(|| args.topics.clone());
        let exam = Exam::new(title, args.topics.clone(), questions);
        let stem = file_stem(&exam.title);

        let exam_path = args
            .output
            .clone()
            .unwrap_or_else(|| self.output_path(&format!("{}.json", stem)));
        save_exam(&exam_path, &exam).await?;

        let mut outputs = vec![exam_path.display().to_string()];

        if args.pdf {
            let exporter = DocumentExporter::new(&self.config);
            let questions_pdf = self.output_path(&format!("{}.pdf", stem));
            let answers_pdf = self.output_path(&format!("{}_answers.pdf", stem));

            exporter
                .export_pdf(&exam.questions, ExportMode::QuestionsOnly, &questions_pdf)
                .await?;
            exporter
                .export_pdf(&exam.questions, ExportMode::WithAnswers, &answers_pdf)
                .await?;

            outputs.push(questions_pdf.display().to_string());
            outputs.push(answers_pdf.display().to_string());
        }

        if let Some(owner) = &args.form_owner {
            let url = FormsClient::new(&self.config)
                .export_quiz(&exam.title, &exam.questions, owner)
                .await?;
            outputs.push(url);
        }

        print_final_stats(exam.questions.len(), &outputs);
        Ok(())
    }

    async fn export_pdf(&self, args: ExportPdfArgs) -> AppResult<()> {
        let exam = load_exam(&args.exam).await?;
        let mode = if args.with_answers {
            ExportMode::WithAnswers
        } else {
            ExportMode::QuestionsOnly
        };

        let exporter = DocumentExporter::new(&self.config);
        if args.markdown {
            exporter
                .export_markdown(&exam.questions, mode, &args.output)
                .await?;
        } else {
            exporter.export_pdf(&exam.questions, mode, &args.output).await?;
        }

        print_final_stats(exam.questions.len(), &[args.output.display().to_string()]);
        Ok(())
    }

    async fn export_form(&self, args: ExportFormArgs) -> AppResult<()> {
        self.config.validate_for_forms()?;

        let exam = load_exam(&args.exam).await?;
        let title = args.title.unwrap_or_else(|| exam.title.clone());

        let url = FormsClient::new(&self.config)
            .export_quiz(&title, &exam.questions, &args.owner)
            .await?;

        print_final_stats(exam.questions.len(), &[url]);
        Ok(())
    }

    async fn import(&self, args: ImportArgs) -> AppResult<()> {
        let text = tokio::fs::read_to_string(&args.input)
            .await
            .map_err(|source| FileError::ReadFailed {
                path: args.input.display().to_string(),
                source,
            })?;

        let questions = LegacyTextParser::parse(&text).map_err(PipelineError::from)?;
        info!("✓ 导入 {} 个题目", questions.len());

        let title = args.title.unwrap_or_else(|| {
            args.input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "exam".to_string())
        });
        let exam = Exam::new(title, String::new(), questions);
        save_exam(&args.output, &exam).await?;

        print_final_stats(exam.questions.len(), &[args.output.display().to_string()]);
        Ok(())
    }

    fn output_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.config.output_dir).join(file_name)
    }
}

/// 由标题生成文件名
fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "exam".to_string()
    } else {
        stem.chars().take(60).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Roman history: the Republic"), "Roman_history__the_Republic");
        assert_eq!(file_stem("  ??  "), "exam");
        assert_eq!(file_stem("罗马史"), "罗马史");
    }

    #[tokio::test]
    async fn test_import_then_export_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("legacy.txt");
        let exam_path = dir.path().join("exam.json");
        let markdown_path = dir.path().join("exam.md");
        tokio::fs::write(&input, "1. Capital of France?\na) Lyon\nb) **Paris**\n")
            .await
            .unwrap();

        let app = App::new(Config::default());
        app.run(Command::Import(ImportArgs {
            input: input.clone(),
            output: exam_path.clone(),
            title: None,
        }))
        .await
        .unwrap();

        let exam = load_exam(&exam_path).await.unwrap();
        assert_eq!(exam.title, "legacy");
        assert_eq!(exam.questions[0].correct_answer, 1);

        app.run(Command::ExportPdf(ExportPdfArgs {
            exam: exam_path,
            output: markdown_path.clone(),
            with_answers: true,
            markdown: true,
        }))
        .await
        .unwrap();

        let markdown = tokio::fs::read_to_string(&markdown_path).await.unwrap();
        assert!(markdown.contains("- [X] Paris"));
    }

    #[tokio::test]
    async fn test_generate_requires_credentials() {
        let app = App::new(Config::default());
        let result = app
            .run(Command::Generate(GenerateArgs {
                topics: "Rust".to_string(),
                questions: 3,
                answers: 4,
                attachments: vec![],
                title: None,
                output: None,
                pdf: false,
                form_owner: None,
            }))
            .await;
        assert!(result.is_err());
    }
}
