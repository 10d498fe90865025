//! 日志系统模块
//!
//! 初始化tracing subscriber，并把 `log` 宏的输出桥接到tracing

use anyhow::Context;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::filter::LevelFilter as TracingLevel;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// 进程内只安装一次subscriber，保存首次安装的结果
static LOGGING_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 基础日志级别，`RUST_LOG` 可以在此之上细化
    pub level: LevelFilter,
    /// 日志文件路径，设置后日志追加写入文件而不是控制台
    pub file_path: Option<PathBuf>,
    /// 是否使用JSON格式
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_path: None,
            json_format: false,
        }
    }
}

/// 初始化日志系统
///
/// 重复调用返回首次初始化的结果，不会重复安装subscriber。
///
/// # 参数
/// * `config` - 日志配置
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    LOGGING_INIT
        .get_or_init(|| install(config).map_err(|e| format!("{e:#}")))
        .clone()
        .map_err(|e| anyhow::anyhow!("日志系统初始化失败: {e}"))
}

fn install(config: &LogConfig) -> anyhow::Result<()> {
    tracing_log::LogTracer::init().context("LogTracer初始化失败")?;

    let filter = EnvFilter::builder()
        .with_default_directive(to_tracing_level(config.level).into())
        .from_env_lossy();

    let timer = fmt::time::ChronoLocal::rfc_3339();
    let output = match &config.file_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("打开日志文件失败: {}", path.display()))?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_timer(timer);
            if config.json_format {
                layer.json().boxed()
            } else {
                layer.boxed()
            }
        }
        None if config.json_format => fmt::layer()
            .json()
            .with_timer(timer)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        None => fmt::layer().with_timer(timer).with_target(false).boxed(),
    };

    registry()
        .with(filter)
        .with(output)
        .try_init()
        .context("tracing subscriber初始化失败")?;

    tracing::debug!("日志配置: {:?}", config);
    Ok(())
}

/// 将 log::LevelFilter 转换为 tracing 的级别
fn to_tracing_level(level: LevelFilter) -> TracingLevel {
    match level {
        LevelFilter::Off => TracingLevel::OFF,
        LevelFilter::Error => TracingLevel::ERROR,
        LevelFilter::Warn => TracingLevel::WARN,
        LevelFilter::Info => TracingLevel::INFO,
        LevelFilter::Debug => TracingLevel::DEBUG,
        LevelFilter::Trace => TracingLevel::TRACE,
    }
}
