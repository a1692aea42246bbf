//! Per-request query telemetry: the accumulator and the pure slow-query
//! summarizer. Emission (and the flags that gate it) belongs to the caller.

pub mod query_log;
pub mod report;

pub use query_log::{QueryLog, QueryRecord};
pub use report::{SlowQueryEntry, SlowQueryReport, summarize};
