//! 告警器实现
//!
//! 根据连续的检测结果维护监控状态，决定何时发出告警、重复告警和恢复通知

use crate::alert::history::CheckHistory;
use crate::alert::state::MonitorState;
use crate::health::{CheckOutcome, Timestamp};
use crate::notification::NotificationRequest;
use chrono::TimeDelta;
use std::time::Duration;
use tracing::debug;

/// 默认的重复告警间隔（5分钟）
pub const DEFAULT_ALERT_INTERVAL: Duration = Duration::from_secs(300);

/// 告警器
///
/// 状态转换规则：
/// - `Up` 收到健康结果：不通知
/// - `Up` 收到非健康结果：进入 `Down`，立即告警
/// - `Down` 收到非健康结果：距上次告警达到间隔时重复告警，否则抑制
/// - `Down` 收到健康结果：回到 `Up`，立即发送恢复通知
///
/// `evaluate` 需要 `&mut self`，同一时刻只能有一次评估。
#[derive(Debug, Clone)]
pub struct Alerter {
    /// 目标URL
    url: String,
    /// 重复告警间隔
    alert_interval: TimeDelta,
    /// 当前监控状态
    state: MonitorState,
    /// 最近的检测历史
    history: CheckHistory,
}

impl Alerter {
    /// 创建新的告警器，初始状态为 `Up`
    ///
    /// # 参数
    /// * `url` - 目标URL
    /// * `alert_interval` - 重复告警间隔
    /// * `history_size` - 保留的检测历史条数
    pub fn new(url: impl Into<String>, alert_interval: Duration, history_size: usize) -> Self {
        Self {
            url: url.into(),
            alert_interval: TimeDelta::from_std(alert_interval).unwrap_or(TimeDelta::MAX),
            state: MonitorState::Up,
            history: CheckHistory::new(history_size),
        }
    }

    /// 以指定状态启动
    pub fn with_state(mut self, state: MonitorState) -> Self {
        self.state = state;
        self
    }

    /// 当前监控状态
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// 最近的检测历史
    pub fn history(&self) -> &CheckHistory {
        &self.history
    }

    /// 目标URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 评估一次检测结果
    ///
    /// # 参数
    /// * `outcome` - 检测结果
    /// * `now` - 观测时间
    ///
    /// # 返回
    /// * `Option<NotificationRequest>` - 需要发送的通知
    pub fn evaluate(&mut self, outcome: &CheckOutcome, now: Timestamp) -> Option<NotificationRequest> {
        self.history.push(outcome.clone(), now);

        match (self.state, outcome.is_healthy()) {
            (MonitorState::Up, true) => None,
            (MonitorState::Down { .. }, true) => {
                self.state = MonitorState::Up;
                Some(NotificationRequest::recovery(self.url.clone(), now))
            }
            (MonitorState::Up, false) => {
                self.state = MonitorState::Down {
                    last_alert_time: now,
                };
                Some(NotificationRequest::critical(
                    self.url.clone(),
                    outcome.clone(),
                    now,
                ))
            }
            (MonitorState::Down { last_alert_time }, false) => {
                if self.alert_interval_elapsed(last_alert_time, now) {
                    self.state = MonitorState::Down {
                        last_alert_time: now,
                    };
                    Some(NotificationRequest::critical(
                        self.url.clone(),
                        outcome.clone(),
                        now,
                    ))
                } else {
                    debug!(
                        "处于告警抑制窗口内，上次告警时间: {}",
                        last_alert_time.format("%Y-%m-%d %H:%M:%S")
                    );
                    None
                }
            }
        }
    }

    /// 判断距上次告警是否已超过告警间隔
    ///
    /// 时钟回拨（`now` 早于上次告警）视为未超过。
    fn alert_interval_elapsed(&self, last_alert_time: Timestamp, now: Timestamp) -> bool {
        now.signed_duration_since(last_alert_time) >= self.alert_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::UnreachableReason;
    use crate::notification::Severity;
    use chrono::{DateTime, Local, Utc};

    const URL: &str = "https://example.com";

    fn at(seconds: i64) -> Timestamp {
        DateTime::<Utc>::from_timestamp(1_700_000_000 + seconds, 0)
            .unwrap()
            .with_timezone(&Local)
    }

    fn alerter() -> Alerter {
        Alerter::new(URL, DEFAULT_ALERT_INTERVAL, 5)
    }

    #[test]
    fn test_initial_state_is_up() {
        let alerter = alerter();
        assert_eq!(alerter.state(), MonitorState::Up);
        assert!(alerter.history().is_empty());
    }

    #[test]
    fn test_first_failure_alerts_immediately() {
        let mut alerter = alerter();
        let outcome = CheckOutcome::Unhealthy { status_code: 500 };

        let request = alerter.evaluate(&outcome, at(0)).unwrap();
        assert_eq!(request.severity, Severity::Critical);
        assert_eq!(request.outcome, outcome);
        assert_eq!(request.observed_at, at(0));
        assert_eq!(request.url, URL);
        assert_eq!(
            alerter.state(),
            MonitorState::Down {
                last_alert_time: at(0)
            }
        );
    }

    #[test]
    fn test_clock_going_backwards_suppresses() {
        let mut alerter = alerter().with_state(MonitorState::Down {
            last_alert_time: at(1000),
        });

        let outcome = CheckOutcome::Unreachable(UnreachableReason::TimedOut);
        assert!(alerter.evaluate(&outcome, at(0)).is_none());
        assert_eq!(alerter.state().last_alert_time(), Some(at(1000)));
    }

    #[test]
    fn test_history_records_every_check() {
        let mut alerter = Alerter::new(URL, DEFAULT_ALERT_INTERVAL, 2);
        alerter.evaluate(&CheckOutcome::Healthy, at(0));
        alerter.evaluate(&CheckOutcome::Unhealthy { status_code: 502 }, at(60));
        alerter.evaluate(&CheckOutcome::Unhealthy { status_code: 503 }, at(120));

        assert_eq!(alerter.history().len(), 2);
        assert_eq!(alerter.history().latest().unwrap().observed_at, at(120));
    }

    #[test]
    fn test_zero_interval_alerts_every_failure() {
        let mut alerter = Alerter::new(URL, Duration::ZERO, 5);
        let outcome = CheckOutcome::Unhealthy { status_code: 500 };

        assert!(alerter.evaluate(&outcome, at(0)).is_some());
        assert!(alerter.evaluate(&outcome, at(0)).is_some());
        assert!(alerter.evaluate(&outcome, at(1)).is_some());
    }
}
