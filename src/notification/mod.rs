//! 通知模块
//!
//! 提供通知请求、消息模板和webhook投递功能

pub mod sink;
pub mod template;
pub mod webhook;

// 重新导出主要类型
pub use sink::{LogOnlySink, NotificationRequest, NotificationSink, Severity};
pub use template::{MessageContext, MessageFormatter};
pub use webhook::WebhookSink;
