//! Uptime Sentry 主程序入口
//!
//! 单目标可用性监控工具

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use uptime_sentry::cli::args::{Args, Commands};
use uptime_sentry::cli::commands::{
    CheckCommand, Command, InitCommand, StartCommand, TestNotificationCommand, ValidateCommand,
    VersionCommand,
};
use uptime_sentry::logging::{init_logging, LogConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        file_path: args.log_file.clone(),
        json_format: args.json_logs,
    };

    init_logging(&log_config).context("初始化日志系统失败")?;

    info!("Uptime Sentry v{} 启动", uptime_sentry::VERSION);

    // 执行命令
    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 执行CLI命令
async fn execute_command(args: &Args) -> Result<()> {
    let command: Box<dyn Command> = match &args.command {
        Commands::Start => Box::new(StartCommand),
        Commands::Check { .. } => Box::new(CheckCommand),
        Commands::Init { .. } => Box::new(InitCommand),
        Commands::Validate { .. } => Box::new(ValidateCommand),
        Commands::TestNotification { .. } => Box::new(TestNotificationCommand),
        Commands::Version { .. } => Box::new(VersionCommand),
    };

    command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
}
