use crate::alert::{AlertEvent, AlertGate};
use crate::counters::PeriodCounters;
use crate::error::IngestResult;
use crate::model::{LogRecord, PeriodReport};
use crate::parse;
use crate::tail::LogTail;
use crate::window::TrafficHistory;
use std::path::PathBuf;
use tracing::{debug, warn};

const TOP_K: usize = 3;
/// Alert payloads are reported as whole hits/second.
const ALERT_RATE_DECIMALS: u32 = 0;

#[derive(Debug, Clone, Copy)]
pub struct MonitorParams {
    pub stats_period_seconds: u64,
    pub alert_period_seconds: u64,
    pub alert_threshold_hits_per_sec: f64,
}

impl MonitorParams {
    /// Number of period samples the alerting window holds.
    pub fn window_capacity(&self) -> usize {
        (self.alert_period_seconds / self.stats_period_seconds.max(1)) as usize
    }
}

/// Outcome of one ingest pass, for logging and diagnostics.
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub lines_read: usize,
    pub records: usize,
    pub rejected: usize,
    pub truncated: bool,
}

/// Owns every piece of long-lived monitoring state: the file cursor, the
/// per-period counters, the traffic history and the alert gate. One
/// instance per process; all mutation happens on the orchestration loop.
#[derive(Debug)]
pub struct Aggregator {
    tail: LogTail,
    counters: PeriodCounters,
    history: TrafficHistory,
    gate: AlertGate,
    period_index: u64,
    params: MonitorParams,
}

impl Aggregator {
    pub fn new(log_file: impl Into<PathBuf>, params: MonitorParams) -> Self {
        Self {
            tail: LogTail::new(log_file),
            counters: PeriodCounters::default(),
            history: TrafficHistory::new(params.window_capacity()),
            gate: AlertGate::default(),
            period_index: 0,
            params,
        }
    }

    /// Number of completed periods; 0 while the first period is open.
    pub fn period_index(&self) -> u64 {
        self.period_index
    }

    pub fn on_alert(&self) -> bool {
        self.gate.on_alert()
    }

    /// Folds one parsed record into the current period's counters.
    pub fn observe(&mut self, record: &LogRecord) {
        self.counters.record(record);
    }

    /// Reads lines appended since the last pass and folds the well-formed
    /// ones into the period counters. Malformed lines are skipped. On error
    /// neither the counters nor the cursor have changed.
    pub fn ingest_new_lines(&mut self) -> IngestResult<IngestSummary> {
        let chunk = self.tail.read_new()?;

        let mut summary = IngestSummary {
            lines_read: chunk.lines.len(),
            truncated: chunk.truncated,
            ..IngestSummary::default()
        };
        for line in &chunk.lines {
            match parse::parse(line) {
                Some(record) => {
                    self.observe(&record);
                    summary.records += 1;
                }
                None => {
                    summary.rejected += 1;
                    debug!("skipping non-W3C line: {line:?}");
                }
            }
        }
        if summary.rejected > 0 {
            warn!(
                "skipped {} malformed line(s) out of {}",
                summary.rejected, summary.lines_read
            );
        }
        Ok(summary)
    }

    /// Snapshot of the open period. Read-only; call before `roll_period`.
    pub fn snapshot_report(&self) -> PeriodReport {
        PeriodReport {
            period_index: self.period_index,
            total_hits: self.counters.total_hits,
            total_bytes: self.counters.total_bytes,
            top_sections: self.counters.sections.top(TOP_K),
            top_users: self.counters.users.top(TOP_K),
            top_error_sections: self.counters.error_sections.top(TOP_K),
        }
    }

    /// Closes the current period: records its hit count in the traffic
    /// history and resets the counters. The very first period is the
    /// monitoring warm-up and is never recorded in the history.
    pub fn roll_period(&mut self) {
        self.period_index += 1;
        if self.period_index > 1 {
            self.history.push(self.counters.total_hits);
        }
        self.counters.clear();
    }

    /// Average hits/second over the whole alert window, rounded to
    /// `decimals` places. Periods the window has not seen yet count as
    /// zero traffic.
    pub fn hit_rate(&self, decimals: u32) -> f64 {
        let capacity = self.history.capacity().max(1) as f64;
        let average = self.history.sum() as f64 / capacity;
        round_to(average / self.params.stats_period_seconds as f64, decimals)
    }

    /// Runs the hysteresis gate against the configured threshold.
    pub fn evaluate_alert(&mut self) -> AlertEvent {
        let rate = self.hit_rate(2);
        let mut event = self
            .gate
            .evaluate(rate, self.params.alert_threshold_hits_per_sec);
        event.hits_per_second = event
            .hits_per_second
            .map(|r| round_to(r, ALERT_RATE_DECIMALS));
        event
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
