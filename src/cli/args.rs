//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Uptime Sentry - 单目标可用性监控工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "uptime-sentry",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "配置文件路径",
        env = "UPTIME_SENTRY_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        default_value = "info",
        help = "日志级别",
        env = "UPTIME_SENTRY_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// 日志文件路径
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "把日志追加写入文件而不是控制台",
        env = "UPTIME_SENTRY_LOG_FILE"
    )]
    pub log_file: Option<PathBuf>,

    /// 以JSON格式输出日志
    #[arg(long, global = true, help = "以JSON格式输出日志")]
    pub json_logs: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 在前台启动监控，直到收到中断信号
    Start,

    /// 对配置的目标执行一次性检测（不发送通知）
    Check {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },

    /// 初始化配置文件
    Init {
        /// 配置文件路径
        #[arg(
            value_name = "FILE",
            help = "配置文件路径",
            default_value = "config.toml"
        )]
        config_path: PathBuf,

        /// 是否覆盖现有文件
        #[arg(short, long, help = "覆盖现有文件")]
        force: bool,
    },

    /// 验证配置文件
    Validate {
        /// 配置文件路径
        #[arg(value_name = "FILE", help = "配置文件路径")]
        config_path: Option<PathBuf>,

        /// 是否显示详细信息
        #[arg(short, long, help = "显示详细信息")]
        verbose: bool,
    },

    /// 通过配置的webhook发送一条测试通知
    TestNotification {
        /// 发送恢复通知而不是告警通知
        #[arg(long, help = "发送恢复通知")]
        recovery: bool,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

impl Args {
    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::get_default_config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_with_config() {
        let args = Args::try_parse_from(["uptime-sentry", "-c", "/tmp/sentry.toml", "start"])
            .unwrap();

        assert!(matches!(args.command, Commands::Start));
        assert_eq!(args.get_config_path(), PathBuf::from("/tmp/sentry.toml"));
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_parse_log_file() {
        let args = Args::try_parse_from([
            "uptime-sentry",
            "start",
            "--log-file",
            "/tmp/sentry.log",
            "--json-logs",
        ])
        .unwrap();

        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/sentry.log")));
        assert!(args.json_logs);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["uptime-sentry", "check", "--format", "json", "-l", "debug"])
                .unwrap();

        assert_eq!(args.log_level, LogLevel::Debug);
        assert!(matches!(
            args.command,
            Commands::Check {
                format: OutputFormat::Json
            }
        ));
    }

    #[test]
    fn test_parse_init_defaults() {
        let args = Args::try_parse_from(["uptime-sentry", "init"]).unwrap();

        match args.command {
            Commands::Init { config_path, force } => {
                assert_eq!(config_path, PathBuf::from("config.toml"));
                assert!(!force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
    }
}
