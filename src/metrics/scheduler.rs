//! Fixed-interval sampling loop.
//!
//! The scheduler owns the cross-cycle tick baseline, drives one assembly
//! cycle per interval, and publishes each finished [`Snapshot`] to
//! subscribers over a broadcast channel. Cycles never overlap: the interval
//! delays missed ticks and the hardware source is guarded so a wedged cycle
//! cannot race a later one.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch, Mutex, Notify};
use tokio::task;
use tokio::time::{self, MissedTickBehavior};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use super::assembler::assemble;
use super::data::Snapshot;
use super::hardware::HardwareSource;
use super::rate::CpuTicks;

/// Sampling loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Milliseconds between cycles
    pub interval_ms: u64,
    /// Wall-clock budget for one cycle in milliseconds; a cycle that
    /// overruns is treated as failed for this cycle only
    pub cycle_budget_ms: u64,
    /// Broadcast buffer depth for slow subscribers
    pub channel_capacity: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: crate::DEFAULT_INTERVAL_MS,
            cycle_budget_ms: crate::DEFAULT_INTERVAL_MS,
            channel_capacity: 16,
        }
    }
}

impl SamplerConfig {
    /// Set the sampling interval in milliseconds.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Set the per-cycle wall-clock budget in milliseconds.
    pub fn with_cycle_budget_ms(mut self, cycle_budget_ms: u64) -> Self {
        self.cycle_budget_ms = cycle_budget_ms;
        self
    }

    /// Set the broadcast buffer depth.
    pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }

    /// The sampling interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// The per-cycle budget as a [`Duration`].
    pub fn cycle_budget(&self) -> Duration {
        Duration::from_millis(self.cycle_budget_ms)
    }
}

/// Lifecycle of the sampling loop, observable through [`Scheduler::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// Waiting for the next interval tick
    Idle,
    /// A cycle is in flight
    Sampling,
    /// Shut down; no further cycles will run
    Stopped,
}

/// Periodic snapshot producer.
///
/// The only mutable state carried across cycles is the previous tick
/// baseline, owned here and replaced only after a cycle fully completes.
/// Published snapshots are plain owned values, safe to consume from any
/// task without locking.
pub struct Scheduler<H: HardwareSource + Send + 'static> {
    source: Arc<Mutex<H>>,
    config: SamplerConfig,
    prev_ticks: Option<CpuTicks>,
    snapshot_tx: broadcast::Sender<Snapshot>,
    state_tx: watch::Sender<SchedulerState>,
}

impl<H: HardwareSource + Send + 'static> Scheduler<H> {
    /// Create a scheduler around a hardware source.
    pub fn new(source: H, config: SamplerConfig) -> Self {
        let (snapshot_tx, _) = broadcast::channel(config.channel_capacity.max(1));
        let (state_tx, _) = watch::channel(SchedulerState::Idle);
        Self {
            source: Arc::new(Mutex::new(source)),
            config,
            prev_ticks: None,
            snapshot_tx,
            state_tx,
        }
    }

    /// Subscribe to published snapshots. Receivers that fall behind skip to
    /// newer snapshots rather than stalling the producer.
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// [`Self::subscribe`] as a stream.
    pub fn subscribe_stream(&self) -> BroadcastStream<Snapshot> {
        BroadcastStream::new(self.snapshot_tx.subscribe())
    }

    /// Observe the loop's lifecycle state.
    pub fn state(&self) -> watch::Receiver<SchedulerState> {
        self.state_tx.subscribe()
    }

    /// Read one tick sample so the first real cycle can derive a load.
    async fn seed_baseline(&mut self) {
        let mut source = self.source.lock().await;
        match source.cpu_ticks() {
            Ok(ticks) => self.prev_ticks = Some(ticks),
            Err(err) => debug!("tick baseline unavailable at startup: {err}"),
        }
    }

    /// Run one cycle on the blocking pool, bounded by the configured budget.
    ///
    /// The tick baseline is committed only when the cycle completes inside
    /// the budget; a timed-out or wedged cycle leaves it untouched and
    /// reports every section unavailable for this cycle.
    async fn sample_once(&mut self) -> Snapshot {
        let source = Arc::clone(&self.source);
        let prev = self.prev_ticks;
        let cycle = task::spawn_blocking(move || {
            // a cycle still wedged from an earlier budget overrun holds the
            // lock; this cycle then fails instead of queueing behind it
            let Ok(mut guard) = source.try_lock() else {
                return None;
            };
            Some(assemble(&mut *guard, prev.as_ref()))
        });

        match time::timeout(self.config.cycle_budget(), cycle).await {
            Ok(Ok(Some((snapshot, new_ticks)))) => {
                if let Some(ticks) = new_ticks {
                    self.prev_ticks = Some(ticks);
                }
                snapshot
            }
            Ok(Ok(None)) => {
                warn!("previous cycle still holds the hardware source, skipping this cycle");
                Snapshot::unavailable()
            }
            Ok(Err(err)) => {
                warn!("sampling task failed: {err}");
                Snapshot::unavailable()
            }
            Err(_) => {
                warn!(
                    "sampling cycle exceeded its {}ms budget",
                    self.config.cycle_budget_ms
                );
                Snapshot::unavailable()
            }
        }
    }

    /// Drive the loop until `shutdown` is notified.
    ///
    /// Every cycle publishes exactly one snapshot, including cycles where
    /// the whole source was unreachable; subscribers always learn that a
    /// cycle happened. Shutdown stops new cycles; an in-flight blocking
    /// cycle is abandoned without its result ever touching the baseline.
    pub async fn run(mut self, shutdown: Arc<Notify>) {
        let mut interval = time::interval(self.config.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick fires immediately; spend it seeding the baseline
        interval.tick().await;
        self.seed_baseline().await;
        info!("sampler started with {}ms interval", self.config.interval_ms);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let _ = self.state_tx.send(SchedulerState::Sampling);
                    let snapshot = self.sample_once().await;
                    debug!(taken_at_ms = snapshot.taken_at_ms, "publishing snapshot");
                    // no subscribers is fine; publication is one-way
                    let _ = self.snapshot_tx.send(snapshot);
                    let _ = self.state_tx.send(SchedulerState::Idle);
                }
                _ = shutdown.notified() => {
                    info!("sampler shutting down");
                    break;
                }
            }
        }

        let _ = self.state_tx.send(SchedulerState::Stopped);
    }

    /// Pull-based alternative to [`Self::run`]: a stream yielding one
    /// snapshot per interval. Dropping the stream stops sampling.
    pub fn into_stream(self) -> BoxStream<'static, Snapshot> {
        let mut interval = time::interval(self.config.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Box::pin(stream::unfold(
            (self, interval),
            |(mut scheduler, mut interval)| async move {
                interval.tick().await;
                if scheduler.prev_ticks.is_none() {
                    scheduler.seed_baseline().await;
                }
                let snapshot = scheduler.sample_once().await;
                Some((snapshot, (scheduler, interval)))
            },
        ))
    }
}
