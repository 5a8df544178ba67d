pub mod aggregate;
pub mod alert;
pub mod counters;
pub mod error;
pub mod model;
pub mod parse;
pub mod tail;
pub mod window;

pub use aggregate::{Aggregator, IngestSummary, MonitorParams};
pub use alert::{AlertEvent, AlertKind};
pub use error::{IngestError, IngestResult};
pub use model::{LogRecord, PeriodReport};
