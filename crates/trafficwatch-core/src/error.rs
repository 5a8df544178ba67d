use thiserror::Error;

pub type IngestResult<T> = Result<T, IngestError>;

/// Failures surfaced by an ingest pass. Parse failures are not errors at
/// this level; malformed lines are counted and skipped per line.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The log source does not exist or cannot be opened right now.
    /// Callers skip this period and retry on the next tick.
    #[error("log source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The source was readable but a read failed partway through.
    /// Counters and cursor are left exactly as they were before the call.
    #[error("read failed: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}
