use crate::cache::HotOptionCache;
use crate::config::Config;
use crate::config::TelemetryConfig;
use crate::db::OptionStoreHandle;
use crate::maintenance::{AutoloadOptimizer, MaintenanceGate, ReapSchedule, TransientReaper};
use crate::server::{handlers, hooks};
use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct CustodianState {
    pub store: OptionStoreHandle,
    pub gate: MaintenanceGate,
    pub reaper: TransientReaper,
    pub optimizer: Arc<AutoloadOptimizer>,
    pub hot_cache: Arc<HotOptionCache>,
    pub reap_schedule: Arc<ReapSchedule>,
    pub telemetry: Arc<TelemetryConfig>,
}

impl CustodianState {
    pub fn new(store: OptionStoreHandle, cfg: &Config) -> Self {
        let gate = MaintenanceGate::new(store.clone());
        let reaper = TransientReaper::new(store.clone());
        let optimizer = Arc::new(AutoloadOptimizer::new(
            store.clone(),
            gate.clone(),
            reaper.clone(),
            cfg.maintenance.daily_cadence_secs,
        ));
        let hot_cache = Arc::new(HotOptionCache::new(
            store.clone(),
            cfg.maintenance.hot_option_keys.clone(),
        ));

        Self {
            store,
            gate,
            reaper,
            optimizer,
            hot_cache,
            reap_schedule: Arc::new(ReapSchedule::new()),
            telemetry: Arc::new(cfg.telemetry.clone()),
        }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

pub fn custodian_router(state: CustodianState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route(
            "/options/{name}",
            get(handlers::get_option)
                .put(handlers::put_option)
                .delete(handlers::delete_option),
        )
        .route("/maintenance/status", get(handlers::maintenance_status))
        .route("/maintenance/reap", post(handlers::trigger_reap))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            hooks::request_hooks,
        ))
        .with_state(state)
}
