use crate::db::OptionStoreHandle;
use crate::error::CustodianError;
use crate::maintenance::classify::should_disable_autoload;
use crate::maintenance::gate::{AUTOLOAD_OPTIMIZE_TASK, MaintenanceGate};
use crate::maintenance::reaper::{ReapOutcome, TransientReaper};
use serde::Serialize;
use tracing::info;

/// What one daily pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OptimizeOutcome {
    pub autoload_disabled: u64,
    pub reap: ReapOutcome,
}

/// The daily maintenance task: shrink the autoload set, then reap transients.
#[derive(Clone)]
pub struct AutoloadOptimizer {
    store: OptionStoreHandle,
    gate: MaintenanceGate,
    reaper: TransientReaper,
    daily_cadence_secs: i64,
}

impl AutoloadOptimizer {
    pub fn new(
        store: OptionStoreHandle,
        gate: MaintenanceGate,
        reaper: TransientReaper,
        daily_cadence_secs: i64,
    ) -> Self {
        Self {
            store,
            gate,
            reaper,
            daily_cadence_secs,
        }
    }

    /// Runs the pass when due; `Ok(None)` with no side effects otherwise.
    ///
    /// The reap runs unconditionally inside a due pass, independent of the
    /// weekly schedule; both paths tolerate overlap.
    pub async fn maybe_run(&self, now: i64) -> Result<Option<OptimizeOutcome>, CustodianError> {
        if !self
            .gate
            .is_due(AUTOLOAD_OPTIMIZE_TASK, self.daily_cadence_secs, now)
            .await?
        {
            return Ok(None);
        }

        let mut autoload_disabled = 0u64;
        for row in self.store.autoloaded_rows().await? {
            if !should_disable_autoload(&row) {
                continue;
            }
            if self.store.set_autoload(&row.name, false).await? {
                autoload_disabled += 1;
            }
        }

        let reap = self.reaper.reap(now).await?;
        self.gate.mark_run(AUTOLOAD_OPTIMIZE_TASK, now).await?;

        info!(
            autoload_disabled,
            expired = reap.expired,
            orphaned = reap.orphaned,
            "daily autoload optimization complete"
        );
        Ok(Some(OptimizeOutcome {
            autoload_disabled,
            reap,
        }))
    }
}
