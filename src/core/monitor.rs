//! 监控主循环
//!
//! 按固定间隔执行 探测 → 评估 → 投递 的检测周期，直到收到停止信号

use crate::alert::{Alerter, MonitorState};
use crate::config::Config;
use crate::health::{CheckOutcome, Observation, Prober};
use crate::notification::{NotificationRequest, NotificationSink, Severity};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// 检测间隔，无论目标是否故障都保持一致
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// 停止时等待未完成通知的最长时间
const DELIVERY_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// 单个检测周期的结果
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 本次探测的观测
    pub observation: Observation,
    /// 本次触发的通知级别
    pub notification: Option<Severity>,
}

/// 单目标监控器
pub struct Monitor {
    /// 探测器
    prober: Arc<dyn Prober>,
    /// 通知投递端
    sink: Arc<dyn NotificationSink>,
    /// 告警器（独占监控状态）
    alerter: Alerter,
    /// 请求超时时间
    request_timeout: Duration,
    /// 检测间隔
    check_interval: Duration,
    /// 正在进行的通知投递
    deliveries: JoinSet<()>,
}

impl Monitor {
    /// 根据配置创建监控器
    ///
    /// # 参数
    /// * `config` - 应用配置
    /// * `prober` - 探测器
    /// * `sink` - 通知投递端
    pub fn new(
        config: &Config,
        prober: Arc<dyn Prober>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let alerter = Alerter::new(
            config.target.url.clone(),
            config.global.alert_interval(),
            config.global.history_size,
        );

        Self {
            prober,
            sink,
            alerter,
            request_timeout: config.global.request_timeout(),
            check_interval: CHECK_INTERVAL,
            deliveries: JoinSet::new(),
        }
    }

    /// 覆盖检测间隔（测试用）
    #[doc(hidden)]
    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    /// 当前监控状态
    pub fn state(&self) -> MonitorState {
        self.alerter.state()
    }

    /// 告警器（只读，用于查看检测历史）
    pub fn alerter(&self) -> &Alerter {
        &self.alerter
    }

    /// 执行一个完整的检测周期
    ///
    /// 通知在后台任务中投递，投递结果不影响监控状态。
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.reap_finished_deliveries();

        let url = self.alerter.url().to_string();
        let observation = self.prober.probe(&url, self.request_timeout).await;
        Self::log_observation(&url, &observation);

        let request = self
            .alerter
            .evaluate(&observation.outcome, observation.observed_at);
        let notification = request.as_ref().map(|r| r.severity);

        if let Some(request) = request {
            self.dispatch(request);
        }

        CycleReport {
            observation,
            notification,
        }
    }

    /// 运行监控主循环，直到收到停止信号
    ///
    /// 信号只会在周期之间生效：正在进行的周期会完整执行，不会再开始新的周期。
    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "开始监控 {}，检测间隔 {} 秒",
            self.alerter.url(),
            self.check_interval.as_secs()
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.check_interval) => {}
                _ = shutdown_rx.recv() => {
                    info!("收到停止信号，监控循环退出");
                    break;
                }
            }
        }

        self.drain_deliveries().await;
        info!("监控已停止");
    }

    /// 在后台投递通知
    fn dispatch(&mut self, request: NotificationRequest) {
        let sink = Arc::clone(&self.sink);
        let severity = request.severity;

        match severity {
            Severity::Critical => warn!("目标不可用，发送告警: {}", request.outcome),
            Severity::Recovery => info!("目标已恢复，发送恢复通知"),
        }

        self.deliveries.spawn(async move {
            match sink.deliver(request).await {
                Ok(()) => info!("{}通知已通过 {} 发送", severity, sink.name()),
                Err(e) => error!("{}通知发送失败 ({}): {}", severity, sink.name(), e),
            }
        });
    }

    /// 回收已完成的投递任务
    fn reap_finished_deliveries(&mut self) {
        while let Some(result) = self.deliveries.try_join_next() {
            if let Err(e) = result {
                error!("通知投递任务异常退出: {}", e);
            }
        }
    }

    /// 停止前等待未完成的投递
    async fn drain_deliveries(&mut self) {
        if self.deliveries.is_empty() {
            return;
        }

        debug!("等待 {} 个通知投递完成", self.deliveries.len());
        let drain = async {
            while let Some(result) = self.deliveries.join_next().await {
                if let Err(e) = result {
                    error!("通知投递任务异常退出: {}", e);
                }
            }
        };

        let drained = tokio::time::timeout(DELIVERY_DRAIN_TIMEOUT, drain).await;
        if drained.is_err() {
            warn!("等待通知投递超时，放弃剩余的通知");
            self.deliveries.abort_all();
        }
    }

    /// 记录每一次检测结果
    fn log_observation(url: &str, observation: &Observation) {
        match &observation.outcome {
            CheckOutcome::Healthy => info!(
                "{} 在线 ({}ms)",
                url,
                observation.response_time_ms()
            ),
            CheckOutcome::Unhealthy { status_code } => warn!(
                "{} 返回状态码 {}: {}",
                url,
                status_code,
                observation.outcome.description()
            ),
            CheckOutcome::Unreachable(_) => warn!(
                "{} {}: {}",
                url,
                observation.outcome,
                observation.outcome.description()
            ),
        }
    }
}
