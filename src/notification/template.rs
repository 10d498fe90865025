//! 消息模板模块
//!
//! 使用Handlebars把通知请求渲染为聊天消息文本

use crate::error::{DeliveryError, NotificationError};
use crate::health::CheckOutcome;
use crate::notification::sink::{NotificationRequest, Severity};
use chrono::Local;
use handlebars::Handlebars;
use serde::Serialize;

/// 观测时间的展示格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CRITICAL_TEMPLATE_NAME: &str = "critical";
const RECOVERY_TEMPLATE_NAME: &str = "recovery";

/// 模板上下文数据
#[derive(Debug, Clone, Serialize)]
pub struct MessageContext {
    /// 项目名称
    pub project_name: String,
    /// 目标URL
    pub url: String,
    /// 状态标签（状态码或传输失败类型）
    pub status_label: String,
    /// 状态描述
    pub status_description: String,
    /// 观测时间
    pub observed_at: String,
}

impl MessageContext {
    /// 从通知请求构建上下文
    pub fn from_request(project_name: &str, request: &NotificationRequest) -> Self {
        Self {
            project_name: project_name.to_string(),
            url: request.url.clone(),
            status_label: request.outcome.status_label(),
            status_description: request.outcome.description().to_string(),
            observed_at: request.observed_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// 消息格式化器
pub struct MessageFormatter {
    /// 项目名称
    project_name: String,
    /// 已注册模板的Handlebars实例
    registry: Handlebars<'static>,
}

impl MessageFormatter {
    /// 使用默认模板创建格式化器
    ///
    /// # 参数
    /// * `project_name` - 项目名称
    ///
    /// # 返回
    /// * `Result<Self, NotificationError>` - 格式化器实例
    pub fn new(project_name: impl Into<String>) -> Result<Self, NotificationError> {
        Self::with_templates(project_name, None, None)
    }

    /// 使用自定义模板创建格式化器，未提供的模板使用默认值
    ///
    /// # 参数
    /// * `project_name` - 项目名称
    /// * `critical_template` - 告警模板
    /// * `recovery_template` - 恢复模板
    ///
    /// # 返回
    /// * `Result<Self, NotificationError>` - 格式化器实例，模板语法错误时返回错误
    pub fn with_templates(
        project_name: impl Into<String>,
        critical_template: Option<&str>,
        recovery_template: Option<&str>,
    ) -> Result<Self, NotificationError> {
        let mut registry = Handlebars::new();
        // 聊天消息是markdown，不做HTML转义
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        registry
            .register_template_string(
                CRITICAL_TEMPLATE_NAME,
                critical_template.unwrap_or(DEFAULT_CRITICAL_TEMPLATE),
            )
            .map_err(|e| NotificationError::TemplateError(format!("告警模板: {e}")))?;
        registry
            .register_template_string(
                RECOVERY_TEMPLATE_NAME,
                recovery_template.unwrap_or(DEFAULT_RECOVERY_TEMPLATE),
            )
            .map_err(|e| NotificationError::TemplateError(format!("恢复模板: {e}")))?;

        let formatter = Self {
            project_name: project_name.into(),
            registry,
        };
        formatter.check_renderable()?;

        Ok(formatter)
    }

    /// 用示例请求试渲染两个模板
    ///
    /// 严格模式下引用不存在的变量只会在渲染时报错，这里提前暴露。
    fn check_renderable(&self) -> Result<(), NotificationError> {
        let now = Local::now();
        let samples = [
            NotificationRequest::critical(
                "https://example.com",
                CheckOutcome::Unhealthy { status_code: 500 },
                now,
            ),
            NotificationRequest::recovery("https://example.com", now),
        ];

        for sample in &samples {
            self.render(sample).map_err(|e| {
                NotificationError::TemplateError(format!("{}模板无法渲染: {e}", sample.severity))
            })?;
        }

        Ok(())
    }

    /// 项目名称
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// 渲染通知请求
    ///
    /// # 参数
    /// * `request` - 通知请求
    ///
    /// # 返回
    /// * `Result<String, DeliveryError>` - 渲染后的消息
    pub fn render(&self, request: &NotificationRequest) -> Result<String, DeliveryError> {
        let template_name = match request.severity {
            Severity::Critical => CRITICAL_TEMPLATE_NAME,
            Severity::Recovery => RECOVERY_TEMPLATE_NAME,
        };
        let context = MessageContext::from_request(&self.project_name, request);

        self.registry
            .render(template_name, &context)
            .map_err(|e| DeliveryError::Render(e.to_string()))
    }
}

/// 默认的告警消息模板
pub const DEFAULT_CRITICAL_TEMPLATE: &str = r#"**🔹 {{project_name}} 🔹**

🚨 **Critical Alert: Webpage Unavailable!** 🚨

- **URL:** [Visit Page]({{url}})
- **Status:** 🔴 {{status_description}} **(Status Code: {{status_label}}) 🔴**
- **Last Checked:** {{observed_at}}

⚠️ **Immediate attention required to restore functionality.**"#;

/// 默认的恢复消息模板
pub const DEFAULT_RECOVERY_TEMPLATE: &str = r#"**🔹 {{project_name}} 🔹**

✅ **Status Update: Webpage Restored** ✅

- **URL:** [Visit Page]({{url}})
- **Status:** 🟢 ONLINE - {{status_description}} **(Status Code: {{status_label}}) 🟢**
- **Last Checked:** {{observed_at}}

ℹ️ **The webpage is now operational and accessible.**"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{CheckOutcome, UnreachableReason};
    use chrono::{DateTime, Local, Utc};

    fn fixed_time() -> crate::health::Timestamp {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .with_timezone(&Local)
    }

    #[test]
    fn test_render_critical_message() {
        let formatter = MessageFormatter::new("HES WEB MONITORING").unwrap();
        let request = NotificationRequest::critical(
            "https://example.com",
            CheckOutcome::Unhealthy { status_code: 503 },
            fixed_time(),
        );

        let message = formatter.render(&request).unwrap();
        assert!(message.contains("HES WEB MONITORING"));
        assert!(message.contains("Critical Alert"));
        assert!(message.contains("https://example.com"));
        assert!(message.contains("Service Unavailable"));
        assert!(message.contains("(Status Code: 503)"));
        assert!(message.contains(&fixed_time().format(TIMESTAMP_FORMAT).to_string()));
    }

    #[test]
    fn test_render_unreachable_message() {
        let formatter = MessageFormatter::new("proj").unwrap();
        let request = NotificationRequest::critical(
            "https://example.com",
            CheckOutcome::Unreachable(UnreachableReason::ConnectionFailed),
            fixed_time(),
        );

        let message = formatter.render(&request).unwrap();
        assert!(message.contains("The page is offline or unreachable."));
        assert!(message.contains("(Status Code: offline or unreachable)"));
    }

    #[test]
    fn test_render_recovery_message() {
        let formatter = MessageFormatter::new("proj").unwrap();
        let request = NotificationRequest::recovery("https://example.com?a=1&b=2", fixed_time());

        let message = formatter.render(&request).unwrap();
        assert!(message.contains("Restored"));
        assert!(message.contains("ONLINE"));
        assert!(message.contains("(Status Code: 200)"));
        // 不做HTML转义
        assert!(message.contains("https://example.com?a=1&b=2"));
    }

    #[test]
    fn test_custom_templates() {
        let formatter = MessageFormatter::with_templates(
            "proj",
            Some("DOWN {{url}} {{status_label}}"),
            Some("UP {{url}}"),
        )
        .unwrap();

        let critical = NotificationRequest::critical(
            "https://example.com",
            CheckOutcome::Unreachable(UnreachableReason::TimedOut),
            fixed_time(),
        );
        assert_eq!(
            formatter.render(&critical).unwrap(),
            "DOWN https://example.com timed out"
        );

        let recovery = NotificationRequest::recovery("https://example.com", fixed_time());
        assert_eq!(formatter.render(&recovery).unwrap(), "UP https://example.com");
    }

    #[test]
    fn test_invalid_template_rejected() {
        let result = MessageFormatter::with_templates("proj", Some("{{#if url}}oops"), None);
        assert!(matches!(result, Err(NotificationError::TemplateError(_))));
    }

    #[test]
    fn test_unknown_variable_rejected_at_construction() {
        let result =
            MessageFormatter::with_templates("proj", Some("{{statuscode}} {{url}}"), None);

        match result {
            Err(NotificationError::TemplateError(message)) => {
                assert!(message.contains("statuscode"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("引用未知变量的模板应被拒绝"),
        }
    }

    #[test]
    fn test_unknown_variable_in_recovery_template_rejected() {
        let result = MessageFormatter::with_templates("proj", None, Some("UP {{status}}"));
        assert!(matches!(result, Err(NotificationError::TemplateError(_))));
    }
}
