use crate::db::actor::OptionStoreHandle;
use crate::db::models::OptionRow;
use crate::error::CustodianError;
use crate::telemetry::QueryLog;
use std::time::Instant;

/// Store handle wrapper that times every statement issued on behalf of a
/// request and records it into that request's [`QueryLog`].
///
/// Maintenance passes use the bare handle; only request-path traffic is
/// observed.
#[derive(Clone)]
pub struct RecordedStore {
    inner: OptionStoreHandle,
    log: QueryLog,
}

impl RecordedStore {
    pub fn new(inner: OptionStoreHandle, log: QueryLog) -> Self {
        Self { inner, log }
    }

    pub async fn get(&self, name: &str) -> Result<Option<OptionRow>, CustodianError> {
        let started = Instant::now();
        let res = self.inner.get(name).await;
        self.log.record(
            format!("SELECT name, value, autoload FROM app_options WHERE name = '{name}'"),
            started.elapsed(),
        );
        res
    }

    pub async fn upsert(
        &self,
        name: &str,
        value: &str,
        autoload: bool,
    ) -> Result<(), CustodianError> {
        let started = Instant::now();
        let res = self.inner.upsert(name, value, autoload).await;
        self.log.record(
            format!("INSERT INTO app_options (name, value, autoload) VALUES ('{name}', ?, {autoload}) ON CONFLICT(name) DO UPDATE"),
            started.elapsed(),
        );
        res
    }

    pub async fn delete(&self, name: &str) -> Result<bool, CustodianError> {
        let started = Instant::now();
        let res = self.inner.delete(name).await;
        self.log.record(
            format!("DELETE FROM app_options WHERE name = '{name}'"),
            started.elapsed(),
        );
        res
    }
}
