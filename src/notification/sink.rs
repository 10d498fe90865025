//! 通知投递模块
//!
//! 定义通知请求、严重级别以及投递接口

use crate::error::DeliveryError;
use crate::health::{CheckOutcome, Timestamp};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// 通知严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 目标不可用（首次告警或持续故障的重复告警）
    Critical,
    /// 目标已恢复
    Recovery,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "告警"),
            Severity::Recovery => write!(f, "恢复"),
        }
    }
}

/// 通知请求
///
/// 由告警器构造，交给投递端后不再保留。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRequest {
    /// 目标URL
    pub url: String,
    /// 触发通知的检测结果
    pub outcome: CheckOutcome,
    /// 观测时间
    pub observed_at: Timestamp,
    /// 严重级别
    pub severity: Severity,
}

impl NotificationRequest {
    /// 创建告警通知
    pub fn critical(url: impl Into<String>, outcome: CheckOutcome, observed_at: Timestamp) -> Self {
        Self {
            url: url.into(),
            outcome,
            observed_at,
            severity: Severity::Critical,
        }
    }

    /// 创建恢复通知
    pub fn recovery(url: impl Into<String>, observed_at: Timestamp) -> Self {
        Self {
            url: url.into(),
            outcome: CheckOutcome::Healthy,
            observed_at,
            severity: Severity::Recovery,
        }
    }
}

/// 通知投递trait
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 投递一条通知
    ///
    /// # 参数
    /// * `request` - 通知请求
    ///
    /// # 返回
    /// * `Result<(), DeliveryError>` - 投递结果
    async fn deliver(&self, request: NotificationRequest) -> Result<(), DeliveryError>;

    /// 投递端名称，用于日志
    fn name(&self) -> &str;
}

/// 未配置webhook时使用的投递端，只记录日志
pub struct LogOnlySink;

#[async_trait]
impl NotificationSink for LogOnlySink {
    async fn deliver(&self, request: NotificationRequest) -> Result<(), DeliveryError> {
        info!(
            "未配置webhook，跳过{}通知: {} - {}",
            request.severity, request.url, request.outcome
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log-only"
    }
}
