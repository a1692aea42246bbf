use crate::db::OptionStoreHandle;
use crate::error::CustodianError;

/// Task id of the daily autoload optimization pass.
pub const AUTOLOAD_OPTIMIZE_TASK: &str = "autoload_optimize";

/// Bookkeeping rows live in `app_options` under this prefix, always with
/// autoload disabled so the gate never re-inflates the set it trims.
const LAST_RUN_KEY_PREFIX: &str = "_maintenance_last_run_";

/// Pure cadence decision: due once at least `cadence_secs` have elapsed.
pub fn due(last_run: i64, cadence_secs: i64, now: i64) -> bool {
    now - last_run >= cadence_secs
}

/// Time-gates maintenance tasks via persisted last-run timestamps.
///
/// Best effort, not a mutex: two racing requests may both observe "due" and
/// both run. The passes underneath are idempotent, so a double run only
/// costs the duplicate statements.
#[derive(Clone)]
pub struct MaintenanceGate {
    store: OptionStoreHandle,
}

impl MaintenanceGate {
    pub fn new(store: OptionStoreHandle) -> Self {
        Self { store }
    }

    fn key(task_id: &str) -> String {
        format!("{LAST_RUN_KEY_PREFIX}{task_id}")
    }

    /// Last recorded run for `task_id`; absent or unreadable rows count as
    /// never run.
    pub async fn last_run(&self, task_id: &str) -> Result<i64, CustodianError> {
        let last = self
            .store
            .get(&Self::key(task_id))
            .await?
            .and_then(|row| row.value.trim().parse::<i64>().ok())
            .unwrap_or(0);
        Ok(last)
    }

    pub async fn is_due(
        &self,
        task_id: &str,
        cadence_secs: i64,
        now: i64,
    ) -> Result<bool, CustodianError> {
        let last_run = self.last_run(task_id).await?;
        Ok(due(last_run, cadence_secs, now))
    }

    pub async fn mark_run(&self, task_id: &str, now: i64) -> Result<(), CustodianError> {
        self.store
            .upsert(&Self::key(task_id), &now.to_string(), false)
            .await
    }
}
