//! Telemetry sampling and derivation.
//!
//! This module turns raw hardware counters into display-ready metrics: tick
//! deltas become load fractions, byte totals become human units, sensor
//! scalars become severity bands, and one immutable snapshot is assembled
//! per polling cycle across independently fallible subsystems.

pub mod assembler;
pub mod data;
pub mod hardware;
pub mod rate;
pub mod scheduler;
pub mod thresholds;
pub mod units;

// Re-export commonly used items
pub use assembler::assemble;
pub use data::Snapshot;
pub use hardware::{HardwareSource, SysinfoSource};
pub use rate::{cpu_load_between, CpuTicks};
pub use scheduler::{SamplerConfig, Scheduler, SchedulerState};
pub use thresholds::TempSeverity;
