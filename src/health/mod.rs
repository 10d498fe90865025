//! 健康检测模块
//!
//! 提供目标探测和检测结果分类功能

pub mod outcome;
pub mod prober;

// 重新导出主要类型
pub use outcome::{
    describe_status_code, CheckOutcome, Observation, Timestamp, UnreachableReason,
};
pub use prober::{HttpProber, Prober};
