//! 告警模块
//!
//! 提供监控状态机、告警节流和检测历史功能

pub mod alerter;
pub mod history;
pub mod state;

// 重新导出主要类型
pub use alerter::{Alerter, DEFAULT_ALERT_INTERVAL};
pub use history::{CheckHistory, CheckRecord, DEFAULT_HISTORY_SIZE};
pub use state::MonitorState;
