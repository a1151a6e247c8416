//! Hardware access seam and its sysinfo-backed implementation.
//!
//! Everything above this module talks to hardware through [`HardwareSource`],
//! so assembly and scheduling can be exercised against scripted sources. The
//! production implementation combines `sysinfo` with direct `/proc` and
//! `/sys` reads for the counters sysinfo does not expose.

use crate::error::{Result, TelemetryError};
use crate::metrics::rate::CpuTicks;
use sysinfo::{Components, Disks, System};

#[cfg(feature = "nvml")]
use nvml_wrapper::Nvml;

/// Raw processor identity, before any derivation.
#[derive(Debug, Clone)]
pub struct CpuIdentity {
    pub model: String,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
}

/// Raw memory totals in bytes.
#[derive(Debug, Clone, Copy)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

/// Raw capacity figures for one mounted volume.
#[derive(Debug, Clone)]
pub struct VolumeReading {
    pub name: String,
    pub mount_point: String,
    pub filesystem: String,
    pub total_bytes: u64,
    pub usable_bytes: u64,
}

/// Raw sensor values. Each field is independently possibly unsupported.
#[derive(Debug, Clone, Default)]
pub struct SensorReading {
    pub cpu_temp_celsius: Option<f32>,
    pub fan_rpm: Vec<u32>,
    pub cpu_voltage: Option<f32>,
}

/// Raw identity of one graphics adapter.
#[derive(Debug, Clone)]
pub struct GpuReading {
    pub name: String,
    pub vendor: String,
    pub driver_version: String,
    pub vram_bytes: Option<u64>,
}

/// Per-subsystem hardware reads.
///
/// Every method may fail independently (unsupported platform, permission
/// denied, missing sensor), and a failure is always distinct from a
/// successful zero or empty reading.
pub trait HardwareSource {
    /// Processor model and core counts.
    fn cpu_identity(&mut self) -> Result<CpuIdentity>;

    /// Cumulative CPU tick counters since boot.
    fn cpu_ticks(&mut self) -> Result<CpuTicks>;

    /// Physical memory totals.
    fn memory(&mut self) -> Result<MemoryReading>;

    /// Every mounted volume, in enumeration order.
    fn volumes(&mut self) -> Result<Vec<VolumeReading>>;

    /// Temperature, fan and voltage sensors.
    fn sensors(&mut self) -> Result<SensorReading>;

    /// Graphics adapters, in enumeration order.
    fn gpus(&mut self) -> Result<Vec<GpuReading>>;

    /// Seconds since boot.
    fn uptime_secs(&mut self) -> Result<u64>;
}

/// Production [`HardwareSource`] backed by sysinfo, `/proc` and `/sys`.
pub struct SysinfoSource {
    system: System,
    disks: Disks,
    components: Components,
    #[cfg(feature = "nvml")]
    nvml: Option<Nvml>,
}

impl SysinfoSource {
    /// Create a source with refreshed hardware lists.
    pub fn new() -> Result<Self> {
        let mut system = System::new_all();
        system.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let components = Components::new_with_refreshed_list();

        #[cfg(feature = "nvml")]
        let nvml = match Nvml::init() {
            Ok(nvml) => Some(nvml),
            Err(err) => {
                tracing::debug!("NVML not available, GPU telemetry disabled: {err}");
                None
            }
        };

        Ok(Self {
            system,
            disks,
            components,
            #[cfg(feature = "nvml")]
            nvml,
        })
    }

    /// One-line host description for display headers.
    pub fn host_description(&self) -> String {
        let os = System::name().unwrap_or_else(|| "unknown".to_string());
        let version = System::os_version().unwrap_or_else(|| "unknown".to_string());
        let host = System::host_name().unwrap_or_else(|| "unknown".to_string());
        format!("{} {} ({})", os, version, host)
    }

    fn cpu_package_temp(&self) -> Option<f32> {
        const CPU_LABELS: [&str; 5] = ["cpu", "package", "tctl", "coretemp", "k10temp"];
        self.components
            .iter()
            .filter(|component| {
                let label = component.label().to_ascii_lowercase();
                CPU_LABELS.iter().any(|hint| label.contains(hint))
            })
            .map(|component| component.temperature())
            .filter(|temp| temp.is_finite())
            .fold(None, |max: Option<f32>, temp| {
                Some(max.map_or(temp, |m| m.max(temp)))
            })
    }
}

impl HardwareSource for SysinfoSource {
    fn cpu_identity(&mut self) -> Result<CpuIdentity> {
        let cpus = self.system.cpus();
        if cpus.is_empty() {
            return Err(TelemetryError::unsupported(
                "no CPU information available",
            ));
        }

        Ok(CpuIdentity {
            model: cpus[0].brand().to_string(),
            physical_cores: self.system.physical_core_count(),
            logical_cores: cpus.len(),
        })
    }

    #[cfg(target_os = "linux")]
    fn cpu_ticks(&mut self) -> Result<CpuTicks> {
        let stat = std::fs::read_to_string("/proc/stat")?;
        parse_proc_stat(&stat)
    }

    #[cfg(not(target_os = "linux"))]
    fn cpu_ticks(&mut self) -> Result<CpuTicks> {
        Err(TelemetryError::unsupported(
            "aggregate CPU tick counters are only exposed on Linux",
        ))
    }

    fn memory(&mut self) -> Result<MemoryReading> {
        self.system.refresh_memory();
        let total_bytes = self.system.total_memory();
        if total_bytes == 0 {
            return Err(TelemetryError::read("zero total memory reported"));
        }

        Ok(MemoryReading {
            total_bytes,
            available_bytes: self.system.available_memory(),
        })
    }

    fn volumes(&mut self) -> Result<Vec<VolumeReading>> {
        self.disks.refresh();
        Ok(self
            .disks
            .iter()
            .map(|disk| VolumeReading {
                name: disk.name().to_string_lossy().to_string(),
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                filesystem: disk.file_system().to_string_lossy().to_string(),
                total_bytes: disk.total_space(),
                usable_bytes: disk.available_space(),
            })
            .collect())
    }

    fn sensors(&mut self) -> Result<SensorReading> {
        self.components.refresh();

        #[cfg_attr(not(target_os = "linux"), allow(unused_mut))]
        let mut reading = SensorReading {
            cpu_temp_celsius: self.cpu_package_temp(),
            ..SensorReading::default()
        };

        #[cfg(target_os = "linux")]
        {
            reading.fan_rpm = read_hwmon_fans();
            reading.cpu_voltage = read_hwmon_vcore();
        }

        if reading.cpu_temp_celsius.is_none()
            && reading.fan_rpm.is_empty()
            && reading.cpu_voltage.is_none()
        {
            return Err(TelemetryError::unsupported(
                "no sensors exposed on this platform",
            ));
        }

        Ok(reading)
    }

    #[cfg(feature = "nvml")]
    fn gpus(&mut self) -> Result<Vec<GpuReading>> {
        let nvml = self
            .nvml
            .as_ref()
            .ok_or_else(|| TelemetryError::unsupported("NVML not available"))?;
        let driver_version = nvml
            .sys_driver_version()
            .map_err(|err| TelemetryError::read(err.to_string()))?;
        let count = nvml
            .device_count()
            .map_err(|err| TelemetryError::read(err.to_string()))?;

        let mut gpus = Vec::with_capacity(count as usize);
        for index in 0..count {
            let device = nvml
                .device_by_index(index)
                .map_err(|err| TelemetryError::read(err.to_string()))?;
            let name = device
                .name()
                .map_err(|err| TelemetryError::read(err.to_string()))?;
            gpus.push(GpuReading {
                name,
                vendor: "NVIDIA".to_string(),
                driver_version: driver_version.clone(),
                vram_bytes: device.memory_info().ok().map(|info| info.total),
            });
        }

        Ok(gpus)
    }

    #[cfg(not(feature = "nvml"))]
    fn gpus(&mut self) -> Result<Vec<GpuReading>> {
        Err(TelemetryError::unsupported(
            "GPU enumeration requires the nvml feature",
        ))
    }

    fn uptime_secs(&mut self) -> Result<u64> {
        Ok(System::uptime())
    }
}

/// Parse the aggregate `cpu` line of `/proc/stat` into a tick vector.
///
/// Field order per proc(5): user nice system idle iowait irq softirq steal.
/// Kernels older than the field's introduction simply omit it; missing
/// trailing fields read as zero.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_proc_stat(stat: &str) -> Result<CpuTicks> {
    let line = stat
        .lines()
        .find(|line| line.starts_with("cpu "))
        .ok_or_else(|| TelemetryError::parse("no aggregate cpu line in /proc/stat"))?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|field| field.parse::<u64>().unwrap_or(0))
        .collect();
    if fields.len() < 4 {
        return Err(TelemetryError::parse("truncated cpu line in /proc/stat"));
    }

    let field = |index: usize| fields.get(index).copied().unwrap_or(0);
    Ok(CpuTicks {
        user: field(0),
        nice: field(1),
        system: field(2),
        idle: field(3),
        iowait: field(4),
        irq: field(5),
        softirq: field(6),
        steal: field(7),
    })
}

#[cfg(target_os = "linux")]
fn read_hwmon_fans() -> Vec<u32> {
    let mut fans = Vec::new();
    let Ok(chips) = std::fs::read_dir("/sys/class/hwmon") else {
        return fans;
    };
    for chip in chips.flatten() {
        let dir = chip.path();
        let Ok(files) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut names: Vec<String> = files
            .flatten()
            .map(|file| file.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("fan") && name.ends_with("_input"))
            .collect();
        names.sort();
        for name in names {
            if let Ok(raw) = std::fs::read_to_string(dir.join(&name)) {
                if let Ok(rpm) = raw.trim().parse::<u32>() {
                    fans.push(rpm);
                }
            }
        }
    }
    fans
}

#[cfg(target_os = "linux")]
fn read_hwmon_vcore() -> Option<f32> {
    let chips = std::fs::read_dir("/sys/class/hwmon").ok()?;
    for chip in chips.flatten() {
        let dir = chip.path();
        let Ok(files) = std::fs::read_dir(&dir) else {
            continue;
        };
        for file in files.flatten() {
            let name = file.file_name().to_string_lossy().into_owned();
            if !(name.starts_with("in") && name.ends_with("_label")) {
                continue;
            }
            let Ok(label) = std::fs::read_to_string(file.path()) else {
                continue;
            };
            if !label.trim().eq_ignore_ascii_case("vcore") {
                continue;
            }
            let input = name.replace("_label", "_input");
            let raw = std::fs::read_to_string(dir.join(input)).ok()?;
            let millivolts: f32 = raw.trim().parse().ok()?;
            return Some(millivolts / 1000.0);
        }
    }
    None
}
