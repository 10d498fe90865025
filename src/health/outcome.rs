//! 检测结果数据结构
//!
//! 定义单次探测的结果类型、不可达原因以及状态码描述表

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 观测时间戳（本地时间，用于展示和告警节流计时）
pub type Timestamp = DateTime<Local>;

/// 视为健康的唯一HTTP状态码
pub const HEALTHY_STATUS_CODE: u16 = 200;

/// 未收录状态码的通用描述
pub const UNKNOWN_STATUS_DESCRIPTION: &str = "Unknown status code";

/// 目标不可达的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "message", rename_all = "snake_case")]
pub enum UnreachableReason {
    /// 无法建立连接（DNS失败、连接被拒绝、网络不可达）
    ConnectionFailed,
    /// 超时未收到响应
    TimedOut,
    /// 其他传输层错误
    OtherError(String),
}

impl UnreachableReason {
    /// 通知消息中使用的状态标签
    pub fn label(&self) -> String {
        match self {
            UnreachableReason::ConnectionFailed => "offline or unreachable".to_string(),
            UnreachableReason::TimedOut => "timed out".to_string(),
            UnreachableReason::OtherError(message) => format!("error: {message}"),
        }
    }

    /// 人类可读的描述
    pub fn description(&self) -> &'static str {
        match self {
            UnreachableReason::ConnectionFailed => "The page is offline or unreachable.",
            UnreachableReason::TimedOut => "The request to the page timed out.",
            UnreachableReason::OtherError(_) => UNKNOWN_STATUS_DESCRIPTION,
        }
    }
}

/// 单次探测的分类结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// 返回200
    Healthy,
    /// 收到了非200的HTTP响应
    Unhealthy { status_code: u16 },
    /// 没有收到HTTP响应
    Unreachable(UnreachableReason),
}

impl CheckOutcome {
    /// 根据HTTP状态码构造结果
    pub fn from_status_code(status_code: u16) -> Self {
        if status_code == HEALTHY_STATUS_CODE {
            CheckOutcome::Healthy
        } else {
            CheckOutcome::Unhealthy { status_code }
        }
    }

    /// 判断结果是否健康
    pub fn is_healthy(&self) -> bool {
        matches!(self, CheckOutcome::Healthy)
    }

    /// 收到的HTTP状态码（不可达时为 `None`）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CheckOutcome::Healthy => Some(HEALTHY_STATUS_CODE),
            CheckOutcome::Unhealthy { status_code } => Some(*status_code),
            CheckOutcome::Unreachable(_) => None,
        }
    }

    /// 通知消息中 "Status Code" 一栏展示的内容
    pub fn status_label(&self) -> String {
        match self {
            CheckOutcome::Unreachable(reason) => reason.label(),
            _ => self
                .status_code()
                .map(|code| code.to_string())
                .unwrap_or_default(),
        }
    }

    /// 人类可读的状态描述
    pub fn description(&self) -> &'static str {
        match self {
            CheckOutcome::Healthy => describe_status_code(HEALTHY_STATUS_CODE),
            CheckOutcome::Unhealthy { status_code } => describe_status_code(*status_code),
            CheckOutcome::Unreachable(reason) => reason.description(),
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Healthy => write!(f, "在线 (HTTP {HEALTHY_STATUS_CODE})"),
            CheckOutcome::Unhealthy { status_code } => write!(f, "异常 (HTTP {status_code})"),
            CheckOutcome::Unreachable(UnreachableReason::ConnectionFailed) => {
                write!(f, "无法连接")
            }
            CheckOutcome::Unreachable(UnreachableReason::TimedOut) => write!(f, "请求超时"),
            CheckOutcome::Unreachable(UnreachableReason::OtherError(message)) => {
                write!(f, "请求出错: {message}")
            }
        }
    }
}

/// 将HTTP状态码映射为人类可读的描述
pub fn describe_status_code(status_code: u16) -> &'static str {
    match status_code {
        200 => "OK - The page is online and operational.",
        301 => "Moved Permanently - The resource has been moved to a new URL.",
        302 => "Found (Temporary Redirect) - The page temporarily redirects to another URL.",
        400 => "Bad Request - The server cannot process the request due to a client error.",
        401 => "Unauthorized - Authentication required or invalid credentials.",
        403 => "Forbidden - Access to the resource is denied.",
        404 => "Not Found - The requested page does not exist.",
        408 => "Request Timeout - The server timed out waiting for the request.",
        500 => "Internal Server Error - A server error occurred.",
        502 => "Bad Gateway - Received an invalid response from the upstream server.",
        503 => "Service Unavailable - The server is overloaded or down for maintenance.",
        504 => "Gateway Timeout - The upstream server did not respond in time.",
        _ => UNKNOWN_STATUS_DESCRIPTION,
    }
}

/// 一次探测的完整观测
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 分类结果
    pub outcome: CheckOutcome,
    /// 分类时刻
    pub observed_at: Timestamp,
    /// 从发起请求到得出结果的耗时
    #[serde(with = "duration_serde")]
    pub response_time: Duration,
}

impl Observation {
    /// 创建新的观测
    pub fn new(outcome: CheckOutcome, observed_at: Timestamp, response_time: Duration) -> Self {
        Self {
            outcome,
            observed_at,
            response_time,
        }
    }

    /// 获取响应时间（毫秒）
    pub fn response_time_ms(&self) -> u64 {
        self.response_time.as_millis() as u64
    }
}

/// Duration序列化模块
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
