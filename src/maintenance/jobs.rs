use crate::maintenance::reaper::TransientReaper;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// One-shot registration guard for the recurring reap job.
///
/// Held by the service state rather than a process global; `ensure_scheduled`
/// spawns the interval task on the first call only, so re-running service
/// wiring cannot stack duplicate schedules.
#[derive(Default)]
pub struct ReapSchedule {
    scheduled: AtomicBool,
}

impl ReapSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled.load(Ordering::SeqCst)
    }

    /// Spawns the weekly reap loop; returns false if already scheduled.
    ///
    /// The first tick fires immediately; failures are logged and the
    /// schedule keeps ticking, since the next pass re-covers anything a
    /// failed one left behind.
    pub fn ensure_scheduled(&self, reaper: TransientReaper, period: Duration) -> bool {
        if self
            .scheduled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        tokio::spawn(async move {
            info!(period_secs = period.as_secs(), "transient reap schedule started");
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match reaper.reap(Utc::now().timestamp()).await {
                    Ok(outcome) => {
                        info!(
                            expired = outcome.expired,
                            orphaned = outcome.orphaned,
                            "scheduled transient reap complete"
                        );
                    }
                    Err(e) => {
                        warn!(error = %e, "scheduled transient reap failed");
                    }
                }
            }
        });
        true
    }
}
