use crate::db::RecordedStore;
use crate::error::CustodianError;
use crate::maintenance::{AUTOLOAD_OPTIMIZE_TASK, ReapOutcome};
use crate::server::router::CustodianState;
use crate::telemetry::QueryLog;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct OptionResponse {
    pub name: String,
    pub value: String,
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
pub struct PutOption {
    pub value: String,
    #[serde(default = "default_autoload")]
    pub autoload: bool,
}

fn default_autoload() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct MaintenanceStatus {
    pub autoload_optimize_last_run: i64,
    pub reap_scheduled: bool,
}

/// Per-request store view; without the recording flag the extension is absent
/// and records go to a detached log that is dropped at request end.
fn recorded_store(state: &CustodianState, log: Option<Extension<QueryLog>>) -> RecordedStore {
    let log = log.map(|Extension(log)| log).unwrap_or_default();
    RecordedStore::new(state.store.clone(), log)
}

pub(super) async fn healthz() -> &'static str {
    "ok"
}

pub(super) async fn get_option(
    State(state): State<CustodianState>,
    log: Option<Extension<QueryLog>>,
    Path(name): Path<String>,
) -> Result<Json<OptionResponse>, CustodianError> {
    if let Some(value) = state.hot_cache.get(&name) {
        return Ok(Json(OptionResponse {
            name,
            value,
            cached: true,
        }));
    }

    let store = recorded_store(&state, log);
    let row = store
        .get(&name)
        .await?
        .ok_or_else(|| CustodianError::OptionNotFound(name.clone()))?;

    state.hot_cache.add(&name, row.value.clone());
    Ok(Json(OptionResponse {
        name: row.name,
        value: row.value,
        cached: false,
    }))
}

pub(super) async fn put_option(
    State(state): State<CustodianState>,
    log: Option<Extension<QueryLog>>,
    Path(name): Path<String>,
    Json(body): Json<PutOption>,
) -> Result<StatusCode, CustodianError> {
    let store = recorded_store(&state, log);
    store.upsert(&name, &body.value, body.autoload).await?;
    state.hot_cache.invalidate(&name);
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn delete_option(
    State(state): State<CustodianState>,
    log: Option<Extension<QueryLog>>,
    Path(name): Path<String>,
) -> Result<StatusCode, CustodianError> {
    let store = recorded_store(&state, log);
    let removed = store.delete(&name).await?;
    if !removed {
        return Err(CustodianError::OptionNotFound(name));
    }
    state.hot_cache.invalidate(&name);
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn maintenance_status(
    State(state): State<CustodianState>,
) -> Result<Json<MaintenanceStatus>, CustodianError> {
    let last_run = state.gate.last_run(AUTOLOAD_OPTIMIZE_TASK).await?;
    Ok(Json(MaintenanceStatus {
        autoload_optimize_last_run: last_run,
        reap_scheduled: state.reap_schedule.is_scheduled(),
    }))
}

/// Manual reap trigger; safe to race with the schedule and the daily pass.
pub(super) async fn trigger_reap(
    State(state): State<CustodianState>,
) -> Result<Json<ReapOutcome>, CustodianError> {
    let outcome = state.reaper.reap(Utc::now().timestamp()).await?;
    Ok(Json(outcome))
}
