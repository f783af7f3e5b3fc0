use crate::core::error::Operation;
use crate::utils::time::{current_timestamp, elapsed_seconds};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one user operation
#[derive(Default)]
pub struct OperationCounters {
    pub total: AtomicU64,
    pub succeeded: AtomicU64,
    pub failed: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl OperationCounters {
    fn snapshot(&self) -> OperationSnapshot {
        OperationSnapshot {
            total: self.total.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

pub struct Metrics {
    pub create: OperationCounters,
    pub read: OperationCounters,
    pub delete: OperationCounters,
    pub list: OperationCounters,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub create: OperationSnapshot,
    pub read: OperationSnapshot,
    pub delete: OperationSnapshot,
    pub list: OperationSnapshot,
    /// `None` when the store could not be counted
    pub stored_users: Option<usize>,
    pub uptime_seconds: i64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            create: OperationCounters::default(),
            read: OperationCounters::default(),
            delete: OperationCounters::default(),
            list: OperationCounters::default(),
            start_time: current_timestamp(),
        }
    }

    fn counters(&self, operation: Operation) -> &OperationCounters {
        match operation {
            Operation::Create => &self.create,
            Operation::Read => &self.read,
            Operation::Delete => &self.delete,
            Operation::List => &self.list,
        }
    }

    /// Count one finished request for `operation`
    pub fn record(&self, operation: Operation, succeeded: bool) {
        let counters = self.counters(operation);
        counters.total.fetch_add(1, Ordering::Relaxed);

        if succeeded {
            counters.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            counters.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_snapshot(&self, stored_users: Option<usize>) -> MetricsSnapshot {
        MetricsSnapshot {
            create: self.create.snapshot(),
            read: self.read.snapshot(),
            delete: self.delete.snapshot(),
            list: self.list.snapshot(),
            stored_users,
            uptime_seconds: elapsed_seconds(self.start_time, current_timestamp()),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
