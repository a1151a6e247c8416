//! Data structures for assembled telemetry snapshots.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::thresholds::TempSeverity;

/// A complete, immutable view of host telemetry for one polling cycle.
///
/// Sections are `None` when their subsystem could not be read this cycle.
/// Absence is never encoded as zero: a missing temperature sensor and a
/// measured 0 RPM fan are different facts, and consumers can tell them apart.
/// A snapshot is replaced wholesale each cycle, never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// When this snapshot was assembled (Unix timestamp in milliseconds)
    pub taken_at_ms: u64,
    /// Processor identity and derived load
    pub cpu: Option<CpuTelemetry>,
    /// Physical memory totals
    pub memory: Option<MemoryTelemetry>,
    /// Per-volume storage usage, in enumeration order
    pub disks: Option<Vec<VolumeTelemetry>>,
    /// Temperature, fan and voltage readings
    pub sensors: Option<SensorTelemetry>,
    /// Graphics adapters, in enumeration order
    pub gpus: Option<Vec<GpuTelemetry>>,
    /// Time since boot
    pub uptime: Option<Duration>,
}

/// Processor identity and the load derived from tick deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuTelemetry {
    /// Processor model string
    pub model: String,
    /// Physical core count, when the platform can tell
    pub physical_cores: Option<usize>,
    /// Logical core count
    pub logical_cores: usize,
    /// Busy fraction in [0.0, 1.0] over the last sampling interval.
    /// `None` on the first cycle or when tick counters are unreadable.
    pub load: Option<f64>,
}

/// Physical memory totals for one cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemoryTelemetry {
    /// Total installed memory in bytes
    pub total_bytes: u64,
    /// Memory available to new allocations in bytes
    pub available_bytes: u64,
    /// Used memory in bytes, always total − available
    pub used_bytes: u64,
}

impl MemoryTelemetry {
    /// Derive the used figure from totals. A transient counter anomaly where
    /// available exceeds total clamps to zero used rather than going negative.
    pub fn from_totals(total_bytes: u64, available_bytes: u64) -> Self {
        Self {
            total_bytes,
            available_bytes,
            used_bytes: total_bytes.saturating_sub(available_bytes),
        }
    }

    /// Used fraction as a percentage, `None` for a zero-sized total.
    pub fn used_percent(&self) -> Option<f32> {
        if self.total_bytes == 0 {
            return None;
        }
        Some((self.used_bytes as f32 / self.total_bytes as f32) * 100.0)
    }
}

/// One mounted storage volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeTelemetry {
    /// Device or volume name (e.g., "/dev/nvme0n1p2")
    pub name: String,
    /// Mount point (e.g., "/", "/boot")
    pub mount_point: String,
    /// Filesystem type (e.g., "ext4", "apfs")
    pub filesystem: String,
    /// Total capacity in bytes
    pub total_bytes: u64,
    /// Used space in bytes, always total − usable
    pub used_bytes: u64,
    /// Usage percentage; `None` for a zero-capacity volume, where the
    /// fraction is undefined
    pub used_percent: Option<f32>,
}

/// Temperature, fan and voltage readings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorTelemetry {
    /// CPU package temperature in °C; `None` when no sensor reported a
    /// plausible (> 0) value
    pub cpu_temp_celsius: Option<f32>,
    /// Severity band derived from the temperature reading
    pub temp_severity: TempSeverity,
    /// Fan speeds in RPM, in enumeration order
    pub fan_rpm: Vec<u32>,
    /// CPU core voltage in volts
    pub cpu_voltage: Option<f32>,
}

/// One graphics adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuTelemetry {
    /// Adapter name
    pub name: String,
    /// Vendor string
    pub vendor: String,
    /// Driver version string
    pub driver_version: String,
    /// Dedicated video memory in bytes, when reported
    pub vram_bytes: Option<u64>,
}

impl Snapshot {
    /// A snapshot with the current timestamp and every section pending.
    pub fn empty() -> Self {
        Self {
            taken_at_ms: now_ms(),
            cpu: None,
            memory: None,
            disks: None,
            sensors: None,
            gpus: None,
            uptime: None,
        }
    }

    /// The snapshot published for a cycle that produced no data at all,
    /// e.g. a timed-out or wedged hardware source.
    pub fn unavailable() -> Self {
        Self::empty()
    }

    /// True when no subsystem produced data this cycle.
    pub fn is_unavailable(&self) -> bool {
        self.cpu.is_none()
            && self.memory.is_none()
            && self.disks.is_none()
            && self.sensors.is_none()
            && self.gpus.is_none()
            && self.uptime.is_none()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
