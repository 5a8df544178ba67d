use serde::{Deserialize, Serialize};

/// One successfully parsed W3C access-log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub user_id: String,
    pub method: String,
    /// Full request path, e.g. `/fruits/orange.jpg`.
    pub path: String,
    /// First path segment after the leading slash; empty when the path is `/`.
    pub section: String,
    pub status: u16,
    pub size_bytes: u64,
}

impl LogRecord {
    pub fn is_error(&self) -> bool {
        (400..=599).contains(&self.status)
    }
}

/// Snapshot of one monitoring period, handed to the renderer before the
/// counters are rolled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodReport {
    /// Number of completed periods; 0 while the first period is still open.
    pub period_index: u64,
    pub total_hits: u64,
    pub total_bytes: u64,
    pub top_sections: Vec<(String, u64)>,
    pub top_users: Vec<(String, u64)>,
    pub top_error_sections: Vec<(String, u64)>,
}
