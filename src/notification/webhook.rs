//! Webhook通知发送器模块
//!
//! 以 `{"text": ...}` 的JSON格式把消息POST到聊天webhook

use crate::config::Config;
use crate::error::{DeliveryError, NotificationError};
use crate::notification::sink::{NotificationRequest, NotificationSink};
use crate::notification::template::MessageFormatter;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// webhook请求的超时时间
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Webhook通知发送器
pub struct WebhookSink {
    /// HTTP客户端
    client: Client,
    /// webhook URL
    webhook_url: String,
    /// 消息格式化器
    formatter: MessageFormatter,
}

impl WebhookSink {
    /// 创建新的webhook发送器
    ///
    /// # 参数
    /// * `webhook_url` - webhook URL
    /// * `formatter` - 消息格式化器
    ///
    /// # 返回
    /// * `Result<Self, NotificationError>` - 发送器实例
    pub fn new(
        webhook_url: impl Into<String>,
        formatter: MessageFormatter,
    ) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(NotificationError::ClientBuild)?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            formatter,
        })
    }

    /// 根据配置创建发送器，未配置webhook URL时返回 `None`
    pub fn from_config(config: &Config) -> Result<Option<Self>, NotificationError> {
        let Some(webhook_url) = config.notification.webhook_url.as_deref() else {
            return Ok(None);
        };

        let formatter = MessageFormatter::with_templates(
            config.global.project_name.as_str(),
            config.notification.critical_template.as_deref(),
            config.notification.recovery_template.as_deref(),
        )?;

        Self::new(webhook_url, formatter).map(Some)
    }

    /// 构建消息体
    fn build_message_body(text: &str) -> Value {
        json!({ "text": text })
    }

    /// 发送一段已渲染的文本
    ///
    /// 只有HTTP 200视为成功。
    pub async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        debug!("发送消息到webhook: {}", self.webhook_url);

        let body = Self::build_message_body(text);
        let response = self.client.post(&self.webhook_url).json(&body).send().await?;

        if response.status() == StatusCode::OK {
            debug!("webhook消息发送成功");
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            // 由调用方统一记录失败
            debug!("webhook返回 {}: {}", status, text);
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(&self, request: NotificationRequest) -> Result<(), DeliveryError> {
        let text = self.formatter.render(&request)?;
        self.send_text(&text).await
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_body_shape() {
        let body = WebhookSink::build_message_body("hello");
        assert_eq!(body, json!({ "text": "hello" }));
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_webhook_sink_creation() {
        let formatter = MessageFormatter::new("proj").unwrap();
        let sink = WebhookSink::new("https://example.com/hook", formatter);
        assert!(sink.is_ok());
        assert_eq!(sink.unwrap().name(), "webhook");
    }

    #[test]
    fn test_from_config_without_webhook() {
        let config: Config = toml::from_str(
            r#"
[global]
project_name = "proj"

[target]
url = "https://example.com"
"#,
        )
        .unwrap();

        assert!(WebhookSink::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_rejects_broken_template() {
        let config: Config = toml::from_str(
            r#"
[global]
project_name = "proj"

[target]
url = "https://example.com"

[notification]
webhook_url = "https://hooks.example.com/abc"
critical_template = "{{#if url}}"
"#,
        )
        .unwrap();

        assert!(matches!(
            WebhookSink::from_config(&config),
            Err(NotificationError::TemplateError(_))
        ));
    }
}
