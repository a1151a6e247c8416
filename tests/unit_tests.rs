use std::sync::Arc;
use std::time::Duration;

use hostvitals::{
    assemble, cpu_load_between, format_bytes, format_duration, CpuIdentity, CpuTicks, GpuReading,
    HardwareSource, MemoryReading, MemoryTelemetry, Result, SamplerConfig, Scheduler,
    SchedulerState, SensorReading, Snapshot, SysinfoSource, TelemetryError, TempSeverity,
    VolumeReading,
};
use tokio::sync::Notify;

/// Scripted hardware source: every `None` field fails its query.
#[derive(Default)]
struct ScriptedSource {
    cpu: Option<CpuIdentity>,
    ticks: Vec<CpuTicks>,
    tick_reads: usize,
    memory: Option<MemoryReading>,
    volumes: Option<Vec<VolumeReading>>,
    sensors: Option<SensorReading>,
    gpus: Option<Vec<GpuReading>>,
    uptime: Option<u64>,
}

impl ScriptedSource {
    fn healthy() -> Self {
        Self {
            cpu: Some(CpuIdentity {
                model: "Scripted CPU".to_string(),
                physical_cores: Some(6),
                logical_cores: 12,
            }),
            ticks: vec![
                CpuTicks {
                    user: 400,
                    system: 100,
                    idle: 1500,
                    ..CpuTicks::default()
                },
                CpuTicks {
                    user: 460,
                    system: 140,
                    idle: 1600,
                    ..CpuTicks::default()
                },
            ],
            memory: Some(MemoryReading {
                total_bytes: 16 * 1024 * 1024 * 1024,
                available_bytes: 6 * 1024 * 1024 * 1024,
            }),
            volumes: Some(vec![
                VolumeReading {
                    name: "/dev/nvme0n1p2".to_string(),
                    mount_point: "/".to_string(),
                    filesystem: "ext4".to_string(),
                    total_bytes: 1_000_000_000,
                    usable_bytes: 400_000_000,
                },
                VolumeReading {
                    name: "overlay".to_string(),
                    mount_point: "/var/overlay".to_string(),
                    filesystem: "overlay".to_string(),
                    total_bytes: 0,
                    usable_bytes: 0,
                },
            ]),
            sensors: Some(SensorReading {
                cpu_temp_celsius: Some(52.0),
                fan_rpm: vec![1400],
                cpu_voltage: Some(1.1),
            }),
            gpus: Some(vec![GpuReading {
                name: "Scripted GPU".to_string(),
                vendor: "ACME".to_string(),
                driver_version: "550.2".to_string(),
                vram_bytes: Some(8 * 1024 * 1024 * 1024),
            }]),
            uptime: Some(90_061),
            ..Self::default()
        }
    }

    fn fail<T>(what: &str) -> Result<T> {
        Err(TelemetryError::unsupported(format!(
            "{what} scripted as failing"
        )))
    }
}

impl HardwareSource for ScriptedSource {
    fn cpu_identity(&mut self) -> Result<CpuIdentity> {
        self.cpu.clone().map_or_else(|| Self::fail("cpu"), Ok)
    }

    fn cpu_ticks(&mut self) -> Result<CpuTicks> {
        if self.ticks.is_empty() {
            return Self::fail("ticks");
        }
        let index = self.tick_reads.min(self.ticks.len() - 1);
        self.tick_reads += 1;
        Ok(self.ticks[index])
    }

    fn memory(&mut self) -> Result<MemoryReading> {
        self.memory.map_or_else(|| Self::fail("memory"), Ok)
    }

    fn volumes(&mut self) -> Result<Vec<VolumeReading>> {
        self.volumes.clone().map_or_else(|| Self::fail("volumes"), Ok)
    }

    fn sensors(&mut self) -> Result<SensorReading> {
        self.sensors.clone().map_or_else(|| Self::fail("sensors"), Ok)
    }

    fn gpus(&mut self) -> Result<Vec<GpuReading>> {
        self.gpus.clone().map_or_else(|| Self::fail("gpus"), Ok)
    }

    fn uptime_secs(&mut self) -> Result<u64> {
        self.uptime.map_or_else(|| Self::fail("uptime"), Ok)
    }
}

/// Byte formatting contract from the display layer's point of view.
#[test]
fn test_format_bytes_contract() {
    assert_eq!(format_bytes(0), "0 B");
    assert!(format_bytes(1023).ends_with("B"));
    assert_eq!(format_bytes(1024), "1.00 KB");
    assert_eq!(format_bytes(-1), "n/a");
    assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
}

#[test]
fn test_format_duration_contract() {
    assert_eq!(format_duration(3661), "0 days, 1 h 1 m 1 s");
    assert_eq!(format_duration(0), "0 days, 0 h 0 m 0 s");
    assert_eq!(format_duration(90_061), "1 days, 1 h 1 m 1 s");
}

#[test]
fn test_cpu_load_stays_in_unit_interval() {
    let prev = CpuTicks {
        user: 10,
        system: 10,
        idle: 80,
        ..CpuTicks::default()
    };
    let cur = CpuTicks {
        user: 30,
        system: 20,
        idle: 150,
        ..CpuTicks::default()
    };
    let load = cpu_load_between(&prev, &cur);
    assert!((0.0..=1.0).contains(&load));

    // counter reset: current behind previous
    assert_eq!(cpu_load_between(&cur, &prev), 0.0);
}

#[test]
fn test_temperature_bands() {
    assert_eq!(TempSeverity::classify(-1.0), TempSeverity::Unknown);
    assert_eq!(TempSeverity::classify(60.0), TempSeverity::Normal);
    assert_eq!(TempSeverity::classify(60.1), TempSeverity::Warm);
    assert_eq!(TempSeverity::classify(80.1), TempSeverity::Critical);
}

/// A failing sensor query degrades only the sensor section.
#[test]
fn test_sensor_failure_keeps_other_sections() {
    let mut source = ScriptedSource::healthy();
    source.sensors = None;

    let (snapshot, _) = assemble(&mut source, None);
    assert!(snapshot.sensors.is_none());
    assert!(snapshot.cpu.is_some());
    assert!(snapshot.memory.is_some());
    assert!(snapshot.disks.is_some());
    assert!(snapshot.gpus.is_some());
    assert!(snapshot.uptime.is_some());
}

/// A zero-capacity volume is reported without a usage fraction and without
/// aborting the rest of the snapshot.
#[test]
fn test_zero_capacity_volume_is_marked_unavailable() {
    let mut source = ScriptedSource::healthy();
    let (snapshot, _) = assemble(&mut source, None);

    let disks = snapshot.disks.expect("disks section");
    assert_eq!(disks.len(), 2);
    let root = &disks[0];
    assert_eq!(root.used_bytes, 600_000_000);
    assert!((root.used_percent.expect("percent") - 60.0).abs() < 0.001);
    let overlay = &disks[1];
    assert_eq!(overlay.used_percent, None);
}

#[test]
fn test_memory_used_is_total_minus_available() {
    let mut source = ScriptedSource::healthy();
    let (snapshot, _) = assemble(&mut source, None);

    let memory = snapshot.memory.expect("memory section");
    assert_eq!(
        memory.used_bytes,
        memory.total_bytes - memory.available_bytes
    );
    assert_eq!(memory.used_bytes, 10 * 1024 * 1024 * 1024);
}

#[test]
fn test_tick_baseline_threads_between_cycles() {
    let mut source = ScriptedSource::healthy();

    let (first, baseline) = assemble(&mut source, None);
    assert_eq!(first.cpu.expect("cpu").load, None);

    let baseline = baseline.expect("baseline");
    let (second, _) = assemble(&mut source, Some(&baseline));
    // scripted delta: 100 busy of 200 elapsed ticks
    let load = second.cpu.expect("cpu").load.expect("load");
    assert!((load - 0.5).abs() < 1e-9);
}

#[test]
fn test_snapshot_serialization_keeps_unavailable_sections() {
    let mut source = ScriptedSource::healthy();
    source.gpus = None;
    let (snapshot, _) = assemble(&mut source, None);

    let json = serde_json::to_string(&snapshot).expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

    // unavailable is null, present-but-empty would be a list
    assert!(value.get("gpus").expect("gpus field").is_null());
    assert!(value.get("memory").expect("memory field").is_object());

    let parsed: Snapshot = serde_json::from_str(&json).expect("deserialize");
    assert!(parsed.gpus.is_none());
    assert_eq!(parsed.uptime, Some(Duration::from_secs(90_061)));
}

#[test]
fn test_memory_percent_helper() {
    let memory = MemoryTelemetry::from_totals(2_048, 512);
    assert_eq!(memory.used_bytes, 1_536);
    assert_eq!(memory.used_percent(), Some(75.0));
}

/// Two scheduled cycles produce two independent snapshot values.
#[tokio::test]
async fn test_scheduler_publishes_independent_snapshots() {
    let config = SamplerConfig::default()
        .with_interval_ms(10)
        .with_cycle_budget_ms(500);
    let scheduler = Scheduler::new(ScriptedSource::healthy(), config);
    let mut rx = scheduler.subscribe();
    let state = scheduler.state();
    let shutdown = Arc::new(Notify::new());
    let sampler = tokio::spawn(scheduler.run(Arc::clone(&shutdown)));

    let mut first = rx.recv().await.expect("first snapshot");
    let second = rx.recv().await.expect("second snapshot");
    assert!(second.taken_at_ms >= first.taken_at_ms);

    first.disks = None;
    first.memory = None;
    assert!(second.disks.is_some());
    assert!(second.memory.is_some());

    shutdown.notify_one();
    sampler.await.expect("sampler task");
    assert_eq!(*state.borrow(), SchedulerState::Stopped);
}

/// A cycle where every subsystem fails still publishes, and the loop
/// keeps ticking afterwards.
#[tokio::test]
async fn test_scheduler_survives_total_failure() {
    let config = SamplerConfig::default()
        .with_interval_ms(10)
        .with_cycle_budget_ms(500);
    let scheduler = Scheduler::new(ScriptedSource::default(), config);
    let mut rx = scheduler.subscribe();
    let shutdown = Arc::new(Notify::new());
    let sampler = tokio::spawn(scheduler.run(Arc::clone(&shutdown)));

    for _ in 0..3 {
        let snapshot = rx.recv().await.expect("snapshot");
        assert!(snapshot.is_unavailable());
    }

    shutdown.notify_one();
    sampler.await.expect("sampler task");
}

/// Smoke test against the real hardware source. Only asserts on reads that
/// work everywhere; platform-dependent subsystems may legitimately fail.
#[tokio::test]
async fn test_sysinfo_source_smoke() {
    let mut source = SysinfoSource::new().expect("source");
    assert!(!source.host_description().is_empty());

    let identity = source.cpu_identity().expect("cpu identity");
    assert!(identity.logical_cores > 0);

    let memory = source.memory().expect("memory");
    assert!(memory.total_bytes > 0);

    source.uptime_secs().expect("uptime");
    let (snapshot, _) = assemble(&mut source, None);
    assert!(snapshot.cpu.is_some());
    assert!(snapshot.memory.is_some());
    assert!(snapshot.uptime.is_some());
}
