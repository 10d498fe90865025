//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Uptime Sentry 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum SentryError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测器相关错误
    #[error("探测器错误: {0}")]
    Probe(#[from] ProbeError),

    /// 通知组件相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// 通知投递错误
    #[error("通知投递失败: {0}")]
    Delivery(#[from] DeliveryError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 探测器错误类型
///
/// 单次探测本身从不失败（传输错误会被归类为 `Unreachable`），
/// 这里只覆盖探测器的构建阶段。
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP客户端创建失败
    #[error("HTTP客户端创建失败: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// 通知组件错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 模板注册或语法错误
    #[error("模板错误: {0}")]
    TemplateError(String),

    /// HTTP客户端创建失败
    #[error("HTTP客户端创建失败: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// 配置错误
    #[error("通知配置错误: {0}")]
    ConfigError(String),
}

/// 单次通知投递的错误类型
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// webhook 返回了非200状态码
    #[error("webhook 拒绝了消息: HTTP {status} - {body}")]
    Rejected { status: u16, body: String },

    /// 网络层发送失败
    #[error("发送请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    /// 消息渲染失败
    #[error("消息渲染失败: {0}")]
    Render(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, SentryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts_into_sentry_error() {
        let err: SentryError = ConfigError::EnvVarError {
            var: "WEBHOOK_URL".to_string(),
        }
        .into();

        assert!(matches!(err, SentryError::Config(_)));
        assert!(err.to_string().contains("WEBHOOK_URL"));
    }

    #[test]
    fn test_rejected_delivery_message() {
        let err = DeliveryError::Rejected {
            status: 400,
            body: "Bad payload".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("Bad payload"));
    }
}
