//! W3C access-log line parser.
//!
//! Expected shape:
//! `127.0.0.1 user-identifier frank [10/Oct/2000:13:55:36 -0700] "GET /test/image.jpg HTTP/1.0" 200 2326`

use crate::model::LogRecord;
use once_cell::sync::Lazy;
use regex::Regex;

static W3C_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\S+ \S+ (?P<userid>\S+) \[[^\]]*\] "(?P<method>\S+) (?P<request>/(?P<section>[^/\s]*)(?:/\S*)?) \S+" (?P<status>\d{3}) (?P<size>\d+)"#,
    )
    .expect("W3C log regex is valid")
});

/// Parses one log line. Returns `None` when the line does not match the
/// W3C shape; a malformed line never aborts ingestion of the rest of the
/// batch. Pure and stateless.
pub fn parse(line: &str) -> Option<LogRecord> {
    let caps = W3C_RE.captures(line)?;
    let status: u16 = caps["status"].parse().ok()?;
    let size_bytes: u64 = caps["size"].parse().ok()?;

    Some(LogRecord {
        user_id: caps["userid"].to_string(),
        method: caps["method"].to_string(),
        path: caps["request"].to_string(),
        section: caps["section"].to_string(),
        status,
        size_bytes,
    })
}
