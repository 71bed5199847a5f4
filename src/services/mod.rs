pub mod answer_sanitizer;
pub mod document_exporter;
pub mod legacy_parser;
pub mod markdown_renderer;
pub mod prompt_builder;
pub mod quiz_form;
pub mod response_parser;

pub use answer_sanitizer::AnswerSanitizer;
pub use document_exporter::DocumentExporter;
pub use legacy_parser::LegacyTextParser;
pub use markdown_renderer::MarkdownRenderer;
pub use prompt_builder::PromptBuilder;
pub use quiz_form::QuizFormBuilder;
pub use response_parser::ResponseParser;
