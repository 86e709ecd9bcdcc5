use std::collections::VecDeque;

use crate::system::process::MemoryStats;

pub const HISTORY_CAPACITY: usize = 15;

/// System-wide aggregates for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub memory_percent: f64,
    /// Swap in use (MB), plotted as a page-fault pressure indicator.
    pub fault_indicator: f64,
}

impl From<&MemoryStats> for HistoryPoint {
    fn from(memory: &MemoryStats) -> Self {
        HistoryPoint {
            memory_percent: memory.used_percent(),
            fault_indicator: memory.swap_used_mb(),
        }
    }
}

/// Fixed-size FIFO of the most recent [`HistoryPoint`]s.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    points: VecDeque<HistoryPoint>,
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingHistory {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn append(&mut self, point: HistoryPoint) {
        if self.points.len() == HISTORY_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Oldest first.
    pub fn values(&self) -> Vec<HistoryPoint> {
        self.points.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<HistoryPoint> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Memory percent in hundredths, for sparklines.
    pub fn memory_series(&self) -> Vec<u64> {
        self.points
            .iter()
            .map(|p| (p.memory_percent * 100.0).round().max(0.0) as u64)
            .collect()
    }

    pub fn fault_series(&self) -> Vec<u64> {
        self.points
            .iter()
            .map(|p| p.fault_indicator.round().max(0.0) as u64)
            .collect()
    }
}
