//! 信号处理模块
//!
//! 把中断信号转换为监控循环的停止通知

use crate::error::Result;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[cfg(unix)]
use signal_hook::consts::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook_tokio::Signals;

/// 强制退出时使用的退出码（128 + SIGINT）
const FORCED_EXIT_CODE: i32 = 130;

/// 收到信号后的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    /// 完成当前周期后停止
    GracefulShutdown,
    /// 立即退出进程
    ForceExit,
}

/// 第一次信号优雅停止，之后的信号强制退出
fn action_for(received: usize) -> SignalAction {
    if received <= 1 {
        SignalAction::GracefulShutdown
    } else {
        SignalAction::ForceExit
    }
}

/// 设置信号处理器
///
/// 第一次收到 SIGINT/SIGTERM（非Unix系统为 Ctrl+C）时向 `shutdown_tx` 发送停止通知，
/// 正在进行的检测和通知投递会继续完成；再次收到信号时立即退出进程。
pub fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>) -> Result<()> {
    #[cfg(unix)]
    {
        setup_unix_signals(shutdown_tx)
    }
    #[cfg(not(unix))]
    {
        setup_ctrl_c(shutdown_tx);
        Ok(())
    }
}

/// Unix/Linux系统信号处理
#[cfg(unix)]
fn setup_unix_signals(shutdown_tx: broadcast::Sender<()>) -> Result<()> {
    use futures::stream::StreamExt;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    tokio::spawn(async move {
        let mut received = 0;
        while let Some(signal) = signals.next().await {
            received += 1;
            let name = if signal == SIGTERM { "SIGTERM" } else { "SIGINT" };
            handle_signal(name, received, &shutdown_tx);
        }
    });

    Ok(())
}

/// 非Unix系统使用 Ctrl+C
#[cfg(not(unix))]
fn setup_ctrl_c(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        let mut received = 0;
        loop {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("监听中断信号失败: {}", err);
                return;
            }
            received += 1;
            handle_signal("Ctrl+C", received, &shutdown_tx);
        }
    });
}

fn handle_signal(name: &str, received: usize, shutdown_tx: &broadcast::Sender<()>) {
    match action_for(received) {
        SignalAction::GracefulShutdown => {
            info!("接收到 {} 信号，完成当前检测后停止（再次发送将强制退出）...", name);
            notify_shutdown(shutdown_tx);
        }
        SignalAction::ForceExit => {
            warn!("再次接收到 {} 信号，强制退出", name);
            std::process::exit(FORCED_EXIT_CODE);
        }
    }
}

fn notify_shutdown(shutdown_tx: &broadcast::Sender<()>) {
    if let Err(e) = shutdown_tx.send(()) {
        error!("发送关闭信号失败: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn test_setup_signal_handlers() {
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);
        assert!(setup_signal_handlers(shutdown_tx).is_ok());
    }

    #[test]
    fn test_second_signal_forces_exit() {
        assert_eq!(action_for(1), SignalAction::GracefulShutdown);
        assert_eq!(action_for(2), SignalAction::ForceExit);
        assert_eq!(action_for(5), SignalAction::ForceExit);
    }

    #[tokio::test]
    async fn test_first_signal_notifies_shutdown() {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            handle_signal("SIGTERM", 1, &shutdown_tx);
        });

        let result = tokio::time::timeout(Duration::from_secs(1), shutdown_rx.recv()).await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
