//! One-shot warm-up of hot configuration values into a fast in-memory cache.

use crate::db::OptionStoreHandle;
use crate::error::CustodianError;
use moka::sync::Cache;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

const HOT_CACHE_CAPACITY: u64 = 64;

/// Pre-warms a small fixed key set from the option store into moka.
///
/// The warm-up guard lives on the struct (one per process in practice, since
/// the service state holds a single instance); it is not shared across
/// processes, so every process performs its own first warm.
pub struct HotOptionCache {
    store: OptionStoreHandle,
    keys: Arc<[String]>,
    cache: Cache<String, String>,
    warmed: OnceCell<()>,
}

impl HotOptionCache {
    pub fn new(store: OptionStoreHandle, keys: Vec<String>) -> Self {
        Self {
            store,
            keys: keys.into(),
            cache: Cache::new(HOT_CACHE_CAPACITY),
            warmed: OnceCell::new(),
        }
    }

    /// Reads each configured key once per process and inserts it only if the
    /// cache has no entry yet; a fresher value cached by another path wins.
    /// Later calls are no-ops.
    pub async fn warm_once(&self) -> Result<(), CustodianError> {
        self.warmed
            .get_or_try_init(|| async {
                for key in self.keys.iter() {
                    if let Some(row) = self.store.get(key).await? {
                        let _ = self.cache.entry(key.clone()).or_insert(row.value);
                    }
                }
                debug!(keys = self.keys.len(), "hot option cache warmed");
                Ok(())
            })
            .await
            .map(|()| ())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key)
    }

    /// Non-overwriting insert, for request paths that already read a value.
    pub fn add(&self, key: &str, value: String) {
        let _ = self.cache.entry(key.to_string()).or_insert(value);
    }

    /// Drops a cached value after the underlying row changes.
    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }
}
