//! 监控状态模块
//!
//! 定义告警器独占的可变状态

use crate::health::Timestamp;
use serde::Serialize;

/// 监控状态
///
/// 只有在发出告警时才会进入 `Down`，因此 `Down` 总是带有最近一次告警时间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MonitorState {
    /// 目标正常（初始状态）
    #[default]
    Up,
    /// 已针对当前故障发出告警，且尚未观察到恢复
    Down {
        /// 最近一次告警的时间
        last_alert_time: Timestamp,
    },
}

impl MonitorState {
    /// 是否处于故障状态
    pub fn is_down(&self) -> bool {
        matches!(self, MonitorState::Down { .. })
    }

    /// 最近一次告警时间（仅在故障状态下存在）
    pub fn last_alert_time(&self) -> Option<Timestamp> {
        match self {
            MonitorState::Up => None,
            MonitorState::Down { last_alert_time } => Some(*last_alert_time),
        }
    }
}
