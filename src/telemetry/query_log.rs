use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One executed statement and how long it took.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecord {
    pub sql: String,
    pub duration_secs: f64,
}

/// Per-request accumulator for executed queries.
///
/// Cloned into the request extensions by the lifecycle middleware and into
/// each [`crate::db::RecordedStore`]; drained once at request end.
#[derive(Debug, Clone, Default)]
pub struct QueryLog {
    records: Arc<Mutex<Vec<QueryRecord>>>,
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, sql: impl Into<String>, duration: Duration) {
        let record = QueryRecord {
            sql: sql.into(),
            duration_secs: duration.as_secs_f64(),
        };
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    /// Drains the accumulated records, leaving the log empty.
    pub fn take(&self) -> Vec<QueryRecord> {
        self.records
            .lock()
            .map(|mut records| std::mem::take(&mut *records))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_in_insertion_order() {
        let log = QueryLog::new();
        log.record("a", Duration::from_millis(10));
        log.record("b", Duration::from_millis(20));

        let records = log.take();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sql, "a");
        assert_eq!(records[1].sql, "b");
        assert!(log.is_empty());
        assert!(log.take().is_empty());
    }
}
