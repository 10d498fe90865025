//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 主配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// 全局配置项
    pub global: GlobalConfig,
    /// 监控目标
    pub target: TargetConfig,
    /// 通知配置
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 项目名称，出现在每条通知中
    pub project_name: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// 重复告警间隔（秒）
    #[serde(default = "default_alert_interval")]
    pub alert_interval_seconds: u64,
    /// 保留的检测历史条数
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

/// 监控目标配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetConfig {
    /// 目标URL
    pub url: String,
}

/// 通知配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    /// webhook URL，未配置时只记录日志
    pub webhook_url: Option<String>,
    /// 自定义告警消息模板
    pub critical_template: Option<String>,
    /// 自定义恢复消息模板
    pub recovery_template: Option<String>,
}

impl GlobalConfig {
    /// 请求超时时间
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// 重复告警间隔
    pub fn alert_interval(&self) -> Duration {
        Duration::from_secs(self.alert_interval_seconds)
    }
}

// 默认值函数
fn default_timeout() -> u64 {
    10
}
fn default_alert_interval() -> u64 {
    crate::alert::DEFAULT_ALERT_INTERVAL.as_secs()
}
fn default_history_size() -> usize {
    crate::alert::DEFAULT_HISTORY_SIZE
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.global.project_name.trim().is_empty() {
        return Err("项目名称不能为空".to_string());
    }

    if config.global.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    if config.global.alert_interval_seconds == 0 {
        return Err("告警间隔不能为0".to_string());
    }

    if config.global.history_size == 0 {
        return Err("检测历史条数不能为0".to_string());
    }

    if !is_http_url(&config.target.url) {
        return Err(format!("目标URL格式无效: {}", config.target.url));
    }

    if let Some(ref webhook_url) = config.notification.webhook_url {
        if !is_http_url(webhook_url) {
            return Err(format!("webhook URL格式无效: {webhook_url}"));
        }
    }

    Ok(())
}
