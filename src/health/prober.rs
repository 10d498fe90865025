//! HTTP探测器实现
//!
//! 对目标URL执行一次带超时的GET请求，并把结果归类为 `CheckOutcome`

use crate::error::{ProbeError, Result};
use crate::health::outcome::{CheckOutcome, Observation, UnreachableReason};
use async_trait::async_trait;
use chrono::Local;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// 探测器trait，定义单次检测接口
#[async_trait]
pub trait Prober: Send + Sync {
    /// 执行一次探测
    ///
    /// 探测不会失败：所有传输层错误都会被归类为 `CheckOutcome::Unreachable`。
    ///
    /// # 参数
    /// * `url` - 目标URL
    /// * `timeout_duration` - 超时时间
    ///
    /// # 返回
    /// * `Observation` - 探测结果及观测时间
    async fn probe(&self, url: &str, timeout_duration: Duration) -> Observation;
}

/// 基于reqwest的HTTP探测器
pub struct HttpProber {
    /// HTTP客户端
    client: Client,
}

impl HttpProber {
    /// 创建新的HTTP探测器
    ///
    /// # 返回
    /// * `Result<Self>` - 探测器实例
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(ProbeError::ClientBuild)?;

        Ok(Self { client })
    }

    /// 归类收到的HTTP响应状态
    fn classify_status(status: StatusCode) -> CheckOutcome {
        CheckOutcome::from_status_code(status.as_u16())
    }

    /// 归类请求错误
    fn classify_error(error: &reqwest::Error) -> CheckOutcome {
        let reason = if error.is_timeout() {
            UnreachableReason::TimedOut
        } else if error.is_connect() {
            UnreachableReason::ConnectionFailed
        } else {
            UnreachableReason::OtherError(error.to_string())
        };

        CheckOutcome::Unreachable(reason)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str, timeout_duration: Duration) -> Observation {
        let start_time = Instant::now();

        // 请求本身也设置超时，避免连接阶段挂起
        let request = self.client.get(url).timeout(timeout_duration).send();
        let response_result = timeout(timeout_duration, request).await;

        let outcome = match response_result {
            Ok(Ok(response)) => Self::classify_status(response.status()),
            Ok(Err(e)) => {
                debug!("探测请求失败 {}: {:?}", url, e);
                Self::classify_error(&e)
            }
            Err(_) => CheckOutcome::Unreachable(UnreachableReason::TimedOut),
        };

        Observation::new(outcome, Local::now(), start_time.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_prober_creation() {
        let prober = HttpProber::new();
        assert!(prober.is_ok());
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(
            HttpProber::classify_status(StatusCode::OK),
            CheckOutcome::Healthy
        );
        assert_eq!(
            HttpProber::classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            CheckOutcome::Unhealthy { status_code: 500 }
        );
        assert_eq!(
            HttpProber::classify_status(StatusCode::MOVED_PERMANENTLY),
            CheckOutcome::Unhealthy { status_code: 301 }
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_other_error() {
        let prober = HttpProber::new().unwrap();
        let observation = prober.probe("not a url", Duration::from_secs(1)).await;

        assert!(matches!(
            observation.outcome,
            CheckOutcome::Unreachable(UnreachableReason::OtherError(_))
        ));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_failed() {
        // 先绑定再释放端口，确保该端口上没有监听者
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let prober = HttpProber::new().unwrap();
        let observation = prober
            .probe(&format!("http://127.0.0.1:{port}/"), Duration::from_secs(2))
            .await;

        assert_eq!(
            observation.outcome,
            CheckOutcome::Unreachable(UnreachableReason::ConnectionFailed)
        );
    }
}
