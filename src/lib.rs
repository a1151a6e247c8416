//! # hostvitals - Host Telemetry Sampling
//!
//! Periodic host hardware telemetry (CPU, memory, disk, sensors, GPU,
//! uptime) with point-in-time derivation: CPU load from cumulative tick
//! deltas, human-readable units, and severity bands for sensor readings.
//!
//! ## Features
//!
//! - **Snapshot assembly**: one immutable [`Snapshot`] per polling cycle,
//!   degrading per subsystem instead of failing whole cycles
//! - **Rate derivation**: counter-reset-safe CPU load from two tick samples
//! - **Scheduling**: a fixed-interval loop that owns the cross-cycle tick
//!   state, bounds each cycle's wall-clock time, and publishes to subscribers
//! - **Hardware seam**: everything is driven through the [`HardwareSource`]
//!   trait, so the engine is testable without hardware
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hostvitals::{SamplerConfig, Scheduler, SysinfoSource};
//! use tokio::sync::Notify;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = SysinfoSource::new()?;
//!     let scheduler = Scheduler::new(source, SamplerConfig::default());
//!     let mut snapshots = scheduler.subscribe();
//!     let shutdown = Arc::new(Notify::new());
//!     tokio::spawn(scheduler.run(Arc::clone(&shutdown)));
//!
//!     while let Ok(snapshot) = snapshots.recv().await {
//!         println!("{}", serde_json::to_string(&snapshot)?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod metrics;

// Re-export public API
pub use error::{Result, TelemetryError};
pub use metrics::{
    assembler::assemble,
    data::{
        CpuTelemetry, GpuTelemetry, MemoryTelemetry, SensorTelemetry, Snapshot, VolumeTelemetry,
    },
    hardware::{
        CpuIdentity, GpuReading, HardwareSource, MemoryReading, SensorReading, SysinfoSource,
        VolumeReading,
    },
    rate::{cpu_load_between, CpuTicks},
    scheduler::{SamplerConfig, Scheduler, SchedulerState},
    thresholds::TempSeverity,
    units::{format_bytes, format_duration},
};

/// The default sampling interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 3000;
