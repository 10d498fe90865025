//! 核心模块
//!
//! 包含监控主循环和进程生命周期管理

pub mod monitor;
pub mod signal_handler;

// 重新导出主要类型
pub use monitor::{CycleReport, Monitor, CHECK_INTERVAL};
pub use signal_handler::setup_signal_handlers;
