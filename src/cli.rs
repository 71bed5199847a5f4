//! 命令行参数

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "exam-generator", version, about = "根据主题生成选择题试卷，并导出为 PDF 或在线测验")]
pub struct Cli {
    /// TOML 配置文件（环境变量优先）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 调用模型生成试卷
    Generate(GenerateArgs),
    /// 把已保存的试卷导出为 PDF
    ExportPdf(ExportPdfArgs),
    /// 把已保存的试卷导出为在线测验
    ExportForm(ExportFormArgs),
    /// 导入手工编号、加粗标记答案的文本试卷
    Import(ImportArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Generate(_) => "generate",
            Command::ExportPdf(_) => "export-pdf",
            Command::ExportForm(_) => "export-form",
            Command::Import(_) => "import",
        }
    }
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// 试卷主题
    #[arg(long)]
    pub topics: String,

    /// 题目数量
    #[arg(long, default_value_t = 10)]
    pub questions: usize,

    /// 每题选项数量
    #[arg(long, default_value_t = 4)]
    pub answers: usize,

    /// 供模型参考的附件，可重复
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,

    /// 试卷标题，默认使用主题
    #[arg(long)]
    pub title: Option<String>,

    /// 试卷保存路径（.json 或 .toml），默认保存到输出目录
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 同时导出试题 PDF 和答案 PDF
    #[arg(long)]
    pub pdf: bool,

    /// 同时导出在线测验，并授予该邮箱编辑权限
    #[arg(long)]
    pub form_owner: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportPdfArgs {
    /// 试卷文件（.json 或 .toml）
    #[arg(long)]
    pub exam: PathBuf,

    /// 输出文件
    #[arg(short, long)]
    pub output: PathBuf,

    /// 勾选正确答案并附上解析
    #[arg(long)]
    pub with_answers: bool,

    /// 只输出 Markdown，不调用转换程序
    #[arg(long)]
    pub markdown: bool,
}

#[derive(Debug, Args)]
pub struct ExportFormArgs {
    /// 试卷文件（.json 或 .toml）
    #[arg(long)]
    pub exam: PathBuf,

    /// 表单标题，默认使用试卷标题
    #[arg(long)]
    pub title: Option<String>,

    /// 授予编辑权限的邮箱
    #[arg(long)]
    pub owner: String,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// 文本试卷
    #[arg(long)]
    pub input: PathBuf,

    /// 保存路径（.json 或 .toml）
    #[arg(short, long)]
    pub output: PathBuf,

    /// 试卷标题，默认使用文件名
    #[arg(long)]
    pub title: Option<String>,
}
