use crate::telemetry::query_log::QueryRecord;
use std::fmt;

/// One query over the threshold, in original execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct SlowQueryEntry {
    /// 1-based position among the slow entries.
    pub index: usize,
    pub duration_secs: f64,
    pub sql: String,
}

/// Aggregated per-request query telemetry; rendered via `Display`, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SlowQueryReport {
    pub total_queries: usize,
    pub total_time_secs: f64,
    pub threshold_secs: f64,
    pub slow: Vec<SlowQueryEntry>,
}

/// Aggregates a request's query records into a slow-query report.
///
/// Pure: no side effects, no flag checks. Returns `None` when there is
/// nothing to report (no records, or none over the threshold); the caller
/// stays silent rather than emitting an empty block.
pub fn summarize(records: &[QueryRecord], threshold_secs: f64) -> Option<SlowQueryReport> {
    if records.is_empty() {
        return None;
    }

    let total_time_secs = records.iter().map(|r| r.duration_secs).sum();
    let slow: Vec<SlowQueryEntry> = records
        .iter()
        .filter(|r| r.duration_secs > threshold_secs)
        .enumerate()
        .map(|(i, r)| SlowQueryEntry {
            index: i + 1,
            duration_secs: r.duration_secs,
            sql: r.sql.clone(),
        })
        .collect();

    if slow.is_empty() {
        return None;
    }

    Some(SlowQueryReport {
        total_queries: records.len(),
        total_time_secs,
        threshold_secs,
        slow,
    })
}

impl fmt::Display for SlowQueryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SLOW QUERIES DETECTED ===")?;
        writeln!(f, "Total queries: {}", self.total_queries)?;
        writeln!(f, "Total time: {}s", self.total_time_secs)?;
        writeln!(
            f,
            "Slow queries (>{}s): {}",
            self.threshold_secs,
            self.slow.len()
        )?;
        for entry in &self.slow {
            writeln!(
                f,
                "Slow Query #{} ({}s): {}",
                entry.index, entry.duration_secs, entry.sql
            )?;
        }
        write!(f, "=== END SLOW QUERIES ===")
    }
}
