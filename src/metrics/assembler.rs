//! One polling cycle: isolated subsystem queries assembled into a snapshot.

use std::time::Duration;
use tracing::warn;

use super::data::{
    CpuTelemetry, GpuTelemetry, MemoryTelemetry, SensorTelemetry, Snapshot, VolumeTelemetry,
};
use super::hardware::{HardwareSource, VolumeReading};
use super::rate::{cpu_load_between, CpuTicks};
use super::thresholds::TempSeverity;

/// Run one assembly cycle against `source`.
///
/// Every subsystem is queried independently: a failing query degrades its
/// own section to `None`, logs a warning, and never aborts the rest of the
/// cycle. Returns the snapshot together with the raw tick sample to retain
/// as the next cycle's baseline; that sample is `None` when the tick read
/// itself failed, so the caller keeps its existing baseline instead of
/// poisoning it.
pub fn assemble(
    source: &mut dyn HardwareSource,
    prev_ticks: Option<&CpuTicks>,
) -> (Snapshot, Option<CpuTicks>) {
    let mut snapshot = Snapshot::empty();

    let new_ticks = match source.cpu_ticks() {
        Ok(ticks) => Some(ticks),
        Err(err) => {
            warn!("cpu tick read failed: {err}");
            None
        }
    };

    snapshot.cpu = match source.cpu_identity() {
        Ok(identity) => {
            // a load needs two samples; the first cycle has only one
            let load = match (prev_ticks, new_ticks.as_ref()) {
                (Some(prev), Some(cur)) => Some(cpu_load_between(prev, cur)),
                _ => None,
            };
            Some(CpuTelemetry {
                model: identity.model,
                physical_cores: identity.physical_cores,
                logical_cores: identity.logical_cores,
                load,
            })
        }
        Err(err) => {
            warn!("cpu identity read failed: {err}");
            None
        }
    };

    snapshot.memory = match source.memory() {
        Ok(memory) => Some(MemoryTelemetry::from_totals(
            memory.total_bytes,
            memory.available_bytes,
        )),
        Err(err) => {
            warn!("memory read failed: {err}");
            None
        }
    };

    snapshot.disks = match source.volumes() {
        Ok(volumes) => Some(volumes.into_iter().map(volume_telemetry).collect()),
        Err(err) => {
            warn!("volume enumeration failed: {err}");
            None
        }
    };

    snapshot.sensors = match source.sensors() {
        Ok(reading) => {
            // readings at or below zero are the missing-sensor sentinel
            let cpu_temp = reading.cpu_temp_celsius.filter(|temp| *temp > 0.0);
            let temp_severity = reading
                .cpu_temp_celsius
                .map_or(TempSeverity::Unknown, TempSeverity::classify);
            Some(SensorTelemetry {
                cpu_temp_celsius: cpu_temp,
                temp_severity,
                fan_rpm: reading.fan_rpm,
                cpu_voltage: reading.cpu_voltage,
            })
        }
        Err(err) => {
            warn!("sensor read failed: {err}");
            None
        }
    };

    snapshot.gpus = match source.gpus() {
        Ok(gpus) => Some(
            gpus.into_iter()
                .map(|gpu| GpuTelemetry {
                    name: gpu.name,
                    vendor: gpu.vendor,
                    driver_version: gpu.driver_version,
                    vram_bytes: gpu.vram_bytes,
                })
                .collect(),
        ),
        Err(err) => {
            warn!("gpu enumeration failed: {err}");
            None
        }
    };

    snapshot.uptime = match source.uptime_secs() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(err) => {
            warn!("uptime read failed: {err}");
            None
        }
    };

    (snapshot, new_ticks)
}

fn volume_telemetry(volume: VolumeReading) -> VolumeTelemetry {
    let used_bytes = volume.total_bytes.saturating_sub(volume.usable_bytes);
    // a zero-capacity pseudo-volume has no defined usage fraction
    let used_percent = if volume.total_bytes == 0 {
        None
    } else {
        Some((used_bytes as f32 / volume.total_bytes as f32) * 100.0)
    };

    VolumeTelemetry {
        name: volume.name,
        mount_point: volume.mount_point,
        filesystem: volume.filesystem,
        total_bytes: volume.total_bytes,
        used_bytes,
        used_percent,
    }
}
