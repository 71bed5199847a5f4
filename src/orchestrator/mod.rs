//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 把命令行子命令调度到下层，负责读写试卷文件和输出统计信息。
//!
//! ## 层次关系
//!
//! ```text
//! App (generate / export-pdf / export-form / import)
//!     ↓
//! workflow::QuestionGenerationPipeline (一次生成)
//!     ↓
//! services (提示词 / 解析 / 渲染 / 导出)
//!     ↓
//! clients + infrastructure (远程服务 / PDF 转换程序)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → clients / infrastructure
//! 2. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod app;

// 重新导出主要类型
pub use app::App;
