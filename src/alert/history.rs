//! 检测历史模块
//!
//! 保存最近若干次检测结果，仅用于诊断，不参与任何告警决策

use crate::health::{CheckOutcome, Timestamp};
use serde::Serialize;
use std::collections::VecDeque;

/// 默认保留的历史条数
pub const DEFAULT_HISTORY_SIZE: usize = 5;

/// 单条检测记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRecord {
    /// 检测结果
    pub outcome: CheckOutcome,
    /// 观测时间
    pub observed_at: Timestamp,
}

/// 固定容量的检测历史环形缓冲区
#[derive(Debug, Clone)]
pub struct CheckHistory {
    records: VecDeque<CheckRecord>,
    capacity: usize,
}

impl CheckHistory {
    /// 创建指定容量的历史缓冲区，容量为0时按1处理
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 追加一条记录，超出容量时丢弃最旧的记录
    pub fn push(&mut self, outcome: CheckOutcome, observed_at: Timestamp) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(CheckRecord {
            outcome,
            observed_at,
        });
    }

    /// 按时间顺序（旧到新）遍历记录
    pub fn iter(&self) -> impl Iterator<Item = &CheckRecord> {
        self.records.iter()
    }

    /// 最新的一条记录
    pub fn latest(&self) -> Option<&CheckRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CheckHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}
