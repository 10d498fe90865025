//! Uptime Sentry - 单目标可用性监控工具
//!
//! 周期性探测一个HTTP端点，并通过聊天webhook发送告警：
//! - 目标首次故障时立即告警
//! - 持续故障期间按告警间隔重复告警
//! - 目标恢复时发送一次恢复通知
//! - 结构化日志记录

pub mod alert;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod health;
pub mod logging;
pub mod notification;

// 重新导出主要类型
pub use alert::{Alerter, MonitorState};
pub use config::Config;
pub use error::SentryError;
pub use health::{CheckOutcome, Observation};
pub use notification::{NotificationRequest, NotificationSink};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
