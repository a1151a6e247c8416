//! hostvitals binary: periodic host telemetry on stdout.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures_util::StreamExt;
use hostvitals::{
    assemble, format_bytes, format_duration, HardwareSource, SamplerConfig, Scheduler, Snapshot,
    SysinfoSource, DEFAULT_INTERVAL_MS,
};
use tokio::sync::Notify;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "hostvitals")]
#[command(about = "Host hardware telemetry sampler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Samples CPU, memory, disk, sensor, GPU and uptime telemetry on a fixed interval")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Sampling interval in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a snapshot at every interval until interrupted (default)
    Watch,

    /// Get a single system snapshot and exit
    Snapshot(SnapshotArgs),

    /// Show a one-line hardware summary
    Info,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Snapshot(args)) => snapshot_command(&cli, args).await,
        Some(Commands::Info) => info_command(),
        Some(Commands::Watch) | None => watch_command(&cli).await,
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    Ok(())
}

async fn watch_command(cli: &Cli) -> anyhow::Result<()> {
    let source = SysinfoSource::new().context("hardware source initialization failed")?;
    println!("hostvitals {} - {}", env!("CARGO_PKG_VERSION"), source.host_description());

    let config = SamplerConfig::default().with_interval_ms(cli.interval);
    let scheduler = Scheduler::new(source, config);
    let mut snapshots = scheduler.subscribe_stream();
    let shutdown = Arc::new(Notify::new());
    let sampler = tokio::spawn(scheduler.run(Arc::clone(&shutdown)));
    info!("sampling every {}ms, Ctrl-C to stop", cli.interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                shutdown.notify_one();
                break;
            }
            next = snapshots.next() => match next {
                Some(Ok(snapshot)) => print_pretty_snapshot(&snapshot),
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    warn!("output fell behind, skipped {skipped} snapshots");
                }
                None => break,
            }
        }
    }

    sampler.await.context("sampler task panicked")?;
    Ok(())
}

async fn snapshot_command(_cli: &Cli, args: &SnapshotArgs) -> anyhow::Result<()> {
    let mut source = SysinfoSource::new().context("hardware source initialization failed")?;

    // seed a tick baseline, then wait briefly so the load has an interval
    let baseline = source.cpu_ticks().ok();
    tokio::time::sleep(Duration::from_millis(250)).await;
    let (snapshot, _) = assemble(&mut source, baseline.as_ref());

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        "pretty" => print_pretty_snapshot(&snapshot),
        other => anyhow::bail!("unsupported format: {other}. Use 'json' or 'pretty'"),
    }

    Ok(())
}

fn info_command() -> anyhow::Result<()> {
    let mut source = SysinfoSource::new().context("hardware source initialization failed")?;
    println!("Host: {}", source.host_description());

    match source.cpu_identity() {
        Ok(cpu) => {
            let physical = cpu
                .physical_cores
                .map_or_else(|| "?".to_string(), |n| n.to_string());
            println!(
                "CPU:  {} ({} physical / {} logical cores)",
                cpu.model, physical, cpu.logical_cores
            );
        }
        Err(err) => println!("CPU:  unavailable ({err})"),
    }

    match source.memory() {
        Ok(memory) => println!("RAM:  {}", format_bytes(memory.total_bytes as i64)),
        Err(err) => println!("RAM:  unavailable ({err})"),
    }

    match source.volumes() {
        Ok(volumes) => println!("Disks: {} volume(s)", volumes.len()),
        Err(err) => println!("Disks: unavailable ({err})"),
    }

    Ok(())
}

fn print_pretty_snapshot(snapshot: &Snapshot) {
    let stamp = chrono::DateTime::from_timestamp_millis(snapshot.taken_at_ms as i64)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M:%S UTC");
    println!("--- snapshot {} ---", stamp);

    match &snapshot.cpu {
        Some(cpu) => {
            let physical = cpu
                .physical_cores
                .map_or_else(|| "?".to_string(), |n| n.to_string());
            let load = cpu
                .load
                .map_or_else(|| "n/a".to_string(), |l| format!("{:.2}%", l * 100.0));
            println!(
                "CPU:     {} ({}/{} cores), load {}",
                cpu.model, physical, cpu.logical_cores, load
            );
        }
        None => println!("CPU:     unavailable"),
    }

    match &snapshot.memory {
        Some(memory) => println!(
            "Memory:  {} used of {} ({} available)",
            format_bytes(memory.used_bytes as i64),
            format_bytes(memory.total_bytes as i64),
            format_bytes(memory.available_bytes as i64),
        ),
        None => println!("Memory:  unavailable"),
    }

    match &snapshot.disks {
        Some(disks) => {
            for disk in disks {
                let percent = disk
                    .used_percent
                    .map_or_else(|| "n/a".to_string(), |p| format!("{:.1}%", p));
                println!(
                    "Disk:    {} ({}) {} / {} ({})",
                    disk.mount_point,
                    disk.filesystem,
                    format_bytes(disk.used_bytes as i64),
                    format_bytes(disk.total_bytes as i64),
                    percent,
                );
            }
        }
        None => println!("Disk:    unavailable"),
    }

    match &snapshot.sensors {
        Some(sensors) => {
            let temp = sensors
                .cpu_temp_celsius
                .map_or_else(|| "n/a".to_string(), |t| format!("{:.1} °C", t));
            let fans = if sensors.fan_rpm.is_empty() {
                "none".to_string()
            } else {
                sensors
                    .fan_rpm
                    .iter()
                    .map(|rpm| format!("{rpm} RPM"))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let voltage = sensors
                .cpu_voltage
                .map_or_else(|| "n/a".to_string(), |v| format!("{:.2} V", v));
            println!(
                "Sensors: cpu {} ({}), fans {}, vcore {}",
                temp,
                sensors.temp_severity.label(),
                fans,
                voltage,
            );
        }
        None => println!("Sensors: unavailable"),
    }

    match &snapshot.gpus {
        Some(gpus) if gpus.is_empty() => println!("GPU:     none detected"),
        Some(gpus) => {
            for gpu in gpus {
                let vram = gpu
                    .vram_bytes
                    .map_or_else(|| "n/a".to_string(), |v| format_bytes(v as i64));
                println!(
                    "GPU:     {} ({}, driver {}, VRAM {})",
                    gpu.name, gpu.vendor, gpu.driver_version, vram
                );
            }
        }
        None => println!("GPU:     unavailable"),
    }

    match snapshot.uptime {
        Some(uptime) => println!("Uptime:  {}", format_duration(uptime.as_secs())),
        None => println!("Uptime:  unavailable"),
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["hostvitals", "--interval", "1000"]).unwrap();
        assert_eq!(cli.interval, 1000);
    }

    #[test]
    fn test_default_values() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["hostvitals"]).unwrap();
        assert_eq!(cli.interval, DEFAULT_INTERVAL_MS);
        assert!(cli.command.is_none());
    }

    #[test]
    fn pretty_printer_accepts_unavailable_snapshots() {
        print_pretty_snapshot(&Snapshot::unavailable());
    }
}
