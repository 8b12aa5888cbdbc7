//! System load telemetry
//!
//! A [`TelemetryCollector`] turns raw readings from a [`LoadSource`] into
//! [`TelemetrySnapshot`]s. Snapshots travel from the background sampler to
//! the UI loop through a single-slot mailbox ([`channel`]) whose "changed"
//! bit doubles as the redraw dirty flag.

use tokio::sync::watch;

use crate::model::TelemetrySnapshot;

/// Cumulative CPU tick counters from the aggregate `cpu` line of `/proc/stat`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTicks {
    /// idle + iowait
    pub idle: u64,
    /// user + nice + system + idle + iowait + irq + softirq
    pub total: u64,
}

impl CpuTicks {
    /// Parse the aggregate `cpu` line of `/proc/stat`.
    pub fn parse(proc_stat: &str) -> Option<Self> {
        let line = proc_stat.lines().find(|l| l.starts_with("cpu "))?;
        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .take(7)
            .map(|f| f.parse::<u64>())
            .collect::<Result<_, _>>()
            .ok()?;
        if fields.len() < 7 {
            return None;
        }

        let idle = fields[3] + fields[4];
        let total = fields.iter().sum();
        Some(Self { idle, total })
    }

    /// Busy percentage between an earlier sample and this one, or `None`
    /// when no time elapsed (or the counters went backwards).
    pub fn busy_percent_since(&self, prev: &CpuTicks) -> Option<u8> {
        let total_delta = self.total.checked_sub(prev.total)?;
        if total_delta == 0 {
            return None;
        }
        let idle_delta = self.idle.saturating_sub(prev.idle).min(total_delta);
        Some((100 - 100 * idle_delta / total_delta) as u8)
    }
}

/// Physical memory totals in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryUsage {
    pub total: u64,
    /// Free plus buffer memory
    pub available: u64,
}

impl MemoryUsage {
    /// Build from the kernel's `sysinfo(2)` counters, which are in units of
    /// `mem_unit` bytes. Page cache is counted as used.
    pub fn from_kernel(total: u64, free: u64, buffers: u64, mem_unit: u64) -> Self {
        let unit = mem_unit.max(1);
        let total = total.saturating_mul(unit);
        let available = free.saturating_add(buffers).saturating_mul(unit);
        Self {
            total,
            available: available.min(total),
        }
    }
}

/// Block counts of a filesystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub available: u64,
}

/// `100 * (total - available) / total`, truncated; `None` for an empty total.
pub fn used_percent(total: u64, available: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(available) as u128;
    Some((used * 100 / total as u128).min(100) as u8)
}

/// Parse a thermal zone reading (milli-degrees Celsius) into whole degrees.
pub fn parse_millidegrees(raw: &str) -> Option<i32> {
    raw.trim().parse::<i64>().ok().map(|m| (m / 1000) as i32)
}

/// Raw, best-effort system readings. Each method returns `None` when its
/// source is unavailable; callers keep the previous value in that case.
pub trait LoadSource {
    fn cpu_ticks(&mut self) -> Option<CpuTicks>;
    fn memory(&mut self) -> Option<MemoryUsage>;
    /// Whole degrees Celsius
    fn temperature(&mut self) -> Option<i32>;
    /// Usage of the root filesystem
    fn root_disk(&mut self) -> Option<DiskUsage>;
}

/// Accumulates readings across sampling passes.
pub struct TelemetryCollector<S> {
    source: S,
    prev_ticks: Option<CpuTicks>,
    current: TelemetrySnapshot,
}

impl<S: LoadSource> TelemetryCollector<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            prev_ticks: None,
            current: TelemetrySnapshot::default(),
        }
    }

    /// Run one sampling pass and return the resulting snapshot.
    ///
    /// CPU load needs two passes; until then it stays at its initial 0.
    pub fn sample(&mut self) -> TelemetrySnapshot {
        let mut next = self.current;

        match self.source.cpu_ticks() {
            Some(ticks) => {
                if let Some(prev) = self.prev_ticks {
                    if let Some(busy) = ticks.busy_percent_since(&prev) {
                        next.cpu_percent = busy;
                    }
                }
                self.prev_ticks = Some(ticks);
            }
            None => tracing::debug!("cpu counters unavailable"),
        }

        match self
            .source
            .memory()
            .and_then(|m| used_percent(m.total, m.available))
        {
            Some(pct) => next.mem_percent = pct,
            None => tracing::debug!("memory totals unavailable"),
        }

        match self.source.temperature() {
            Some(celsius) => next.temp_celsius = celsius,
            None => tracing::debug!("thermal sensor unavailable"),
        }

        match self
            .source
            .root_disk()
            .and_then(|d| used_percent(d.total, d.available))
        {
            Some(pct) => next.disk_percent = pct,
            None => tracing::debug!("root filesystem usage unavailable"),
        }

        self.current = next;
        next
    }
}

/// Create the sampler -> UI mailbox, starting from an all-zero snapshot.
pub fn channel() -> (TelemetryPublisher, TelemetryFeed) {
    let (tx, rx) = watch::channel(TelemetrySnapshot::default());
    (TelemetryPublisher { tx }, TelemetryFeed { rx })
}

/// Producer half, owned by the sampler.
pub struct TelemetryPublisher {
    tx: watch::Sender<TelemetrySnapshot>,
}

impl TelemetryPublisher {
    /// Store `snapshot` and raise the dirty flag if any field changed.
    /// Returns whether the flag was raised.
    pub fn publish(&self, snapshot: TelemetrySnapshot) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        })
    }
}

/// Consumer half, owned by the UI loop.
pub struct TelemetryFeed {
    rx: watch::Receiver<TelemetrySnapshot>,
}

impl TelemetryFeed {
    /// Test-and-clear the dirty flag. Any number of unread changes is
    /// observed exactly once.
    pub fn take_changed(&mut self) -> bool {
        // Also works after the sampler has gone away
        self.rx.borrow_and_update().has_changed()
    }

    /// Latest published snapshot (never a mix of two passes)
    pub fn latest(&self) -> TelemetrySnapshot {
        *self.rx.borrow()
    }
}
