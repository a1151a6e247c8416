//! CPU load derivation from cumulative tick counters.
//!
//! The kernel exposes CPU time as monotonically growing per-state tick
//! counters. A single sample carries no rate information; two samples taken
//! at different times bound an interval whose busy fraction is the
//! instantaneous load.

use serde::{Deserialize, Serialize};

/// One cumulative sample of per-state CPU tick counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTicks {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTicks {
    /// Sum of every counted state.
    pub fn total(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.idle)
            .saturating_add(self.iowait)
            .saturating_add(self.irq)
            .saturating_add(self.softirq)
            .saturating_add(self.steal)
    }

    /// Ticks spent doing no work: idle plus I/O wait.
    pub fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }
}

/// Fraction of elapsed ticks spent in non-idle states between two cumulative
/// samples, always within `[0.0, 1.0]`.
///
/// A counter reset (sleep/resume, wraparound) leaves the current sample
/// behind the previous one; such cycles report `0.0` instead of a negative
/// or out-of-range fraction. An empty interval (no elapsed ticks) also
/// reports `0.0`.
pub fn cpu_load_between(prev: &CpuTicks, cur: &CpuTicks) -> f64 {
    let prev_total = prev.total();
    let cur_total = cur.total();
    if cur_total <= prev_total {
        return 0.0;
    }

    let total_delta = cur_total - prev_total;
    let idle_delta = cur.idle_total().saturating_sub(prev.idle_total());
    let busy_delta = total_delta.saturating_sub(idle_delta);

    (busy_delta as f64 / total_delta as f64).clamp(0.0, 1.0)
}
