//! # Exam Generator
//!
//! 根据主题（和可选的参考附件）调用大模型生成选择题试卷，
//! 并导出为 PDF 或在线测验
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 外部程序调用
//! - `PdfConverter` - 调用 Markdown 转 PDF 程序
//!
//! ### ② 客户端（Clients）
//! - `clients/` - 远程服务协议
//! - `GenerationBackend` - 上传 / 提交 / 轮询 / 取回 / 释放 能力
//! - `AssistantClient` / `ChatClient` - 两种生成后端
//! - `FormsClient` - 在线测验导出
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `PromptBuilder` - 提示词
//! - `ResponseParser` - 解析模型返回的 JSON
//! - `MarkdownRenderer` / `DocumentExporter` - 文档导出
//! - `LegacyTextParser` - 旧格式文本导入
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一次生成"的完整流程
//! - `QuestionGenerationPipeline` - 提示词 → 远程生成 → 解析 → 释放附件
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/` - 命令调度、读写试卷文件、输出统计
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ErrorKind, PipelineError};
pub use models::{Exam, Question};
pub use orchestrator::App;
pub use workflow::QuestionGenerationPipeline;
