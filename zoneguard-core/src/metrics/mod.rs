//! metrics — injected sink for per-frame counters
//!
//! The engine reports every processed frame to a `MetricsSink` it is handed
//! at construction.  `PerfMonitor` keeps per-stream totals and logs the frame
//! rate of every stream once per reporting interval.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::info;

use crate::summary::FrameSummary;

pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

pub trait MetricsSink: Send + Sync {
    fn record_frame(&self, stream_id: u32, summary: &FrameSummary);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_frame(&self, _stream_id: u32, _summary: &FrameSummary) {}
}

/// Running totals for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamTotals {
    pub frames: u64,
    pub persons: u64,
    pub alerts: u64,
}

#[derive(Debug, Default)]
struct StreamPerf {
    totals: StreamTotals,
    interval_frames: u64,
    last_persons: usize,
    last_alerts: usize,
}

#[derive(Debug)]
struct PerfState {
    interval_start: Instant,
    streams: BTreeMap<u32, StreamPerf>,
}

#[derive(Debug)]
pub struct PerfMonitor {
    interval: Duration,
    state: Mutex<PerfState>,
}

impl PerfMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(PerfState {
                interval_start: Instant::now(),
                streams: BTreeMap::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<u32, StreamTotals> {
        self.lock()
            .streams
            .iter()
            .map(|(&id, perf)| (id, perf.totals))
            .collect()
    }

    /// Takes the state lock, recovering it if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, PerfState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PerfMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_INTERVAL)
    }
}

impl MetricsSink for PerfMonitor {
    fn record_frame(&self, stream_id: u32, summary: &FrameSummary) {
        let mut state = self.lock();

        let perf = state.streams.entry(stream_id).or_default();
        perf.totals.frames += 1;
        perf.totals.persons += summary.person_count as u64;
        perf.totals.alerts += summary.alert_count as u64;
        perf.interval_frames += 1;
        perf.last_persons = summary.person_count;
        perf.last_alerts = summary.alert_count;

        let elapsed = state.interval_start.elapsed();
        if elapsed < self.interval {
            return;
        }
        let secs = elapsed.as_secs_f64().max(f64::EPSILON);
        for (&stream_id, perf) in state.streams.iter_mut() {
            info!(
                stream_id,
                fps = format!("{:.2}", perf.interval_frames as f64 / secs),
                persons = perf.last_persons,
                alerts = perf.last_alerts,
                "stream throughput"
            );
            perf.interval_frames = 0;
        }
        state.interval_start = Instant::now();
    }
}
