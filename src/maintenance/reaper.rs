use crate::db::OptionStoreHandle;
use crate::error::CustodianError;
use crate::maintenance::classify::{
    TRANSIENT_PREFIX, TRANSIENT_TIMEOUT_PREFIX, is_transient_data_key, marker_expired, pair_name,
};
use ahash::AHashSet;
use serde::Serialize;
use tracing::debug;

/// Row counts removed by one reap pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReapOutcome {
    pub expired: u64,
    pub orphaned: u64,
}

/// Deletes expired expiry markers, then transient data rows left without a
/// live marker.
///
/// Both steps are set-based deletes by exact name, so re-running against
/// unchanged data removes nothing, and overlapping runs (weekly schedule vs.
/// the daily optimizer) are harmless.
#[derive(Clone)]
pub struct TransientReaper {
    store: OptionStoreHandle,
}

impl TransientReaper {
    pub fn new(store: OptionStoreHandle) -> Self {
        Self { store }
    }

    pub async fn reap(&self, now: i64) -> Result<ReapOutcome, CustodianError> {
        // Step 1: expired markers.
        let markers = self.store.rows_with_prefix(TRANSIENT_TIMEOUT_PREFIX).await?;
        let expired_names: Vec<String> = markers
            .iter()
            .filter(|row| marker_expired(&row.value, now))
            .map(|row| row.name.clone())
            .collect();
        let expired = self.store.delete_named(expired_names).await?;

        // Step 2: orphaned data rows. Markers are re-read so the live set
        // reflects step 1's deletions; a marker expiring above orphans its
        // data row within the same pass.
        let live_markers = self.store.rows_with_prefix(TRANSIENT_TIMEOUT_PREFIX).await?;
        let live: AHashSet<&str> = live_markers
            .iter()
            .filter_map(|row| pair_name(&row.name))
            .collect();

        let transients = self.store.rows_with_prefix(TRANSIENT_PREFIX).await?;
        let orphaned_names: Vec<String> = transients
            .iter()
            .filter(|row| is_transient_data_key(&row.name))
            .filter(|row| pair_name(&row.name).is_none_or(|name| !live.contains(name)))
            .map(|row| row.name.clone())
            .collect();
        let orphaned = self.store.delete_named(orphaned_names).await?;

        debug!(expired, orphaned, "transient cleanup removed rows");
        Ok(ReapOutcome { expired, orphaned })
    }
}
