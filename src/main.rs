use anyhow::Result;
use clap::Parser;

use exam_generator::cli::Cli;
use exam_generator::utils::logging;
use exam_generator::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置：配置文件 → 环境变量覆盖
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?.with_env(),
        None => Config::from_env(),
    };
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    App::new(config).run(cli.command).await
}
