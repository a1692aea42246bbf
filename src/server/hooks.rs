use crate::error::CustodianError;
use crate::server::router::CustodianState;
use crate::telemetry::{QueryLog, summarize};
use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use chrono::Utc;
use tracing::warn;

/// Request lifecycle hooks around the whole router.
///
/// Early: run the gated daily optimization and the one-shot hot-option warm.
/// Store failures here surface through the normal error response; there are
/// no local retries. Late: drain the request's query log and emit the
/// slow-query block when both telemetry flags are on. Emission itself cannot
/// fail the request.
pub async fn request_hooks(
    State(state): State<CustodianState>,
    mut req: Request,
    next: Next,
) -> Result<Response, CustodianError> {
    let now = Utc::now().timestamp();
    state.optimizer.maybe_run(now).await?;
    state.hot_cache.warm_once().await?;

    let recording = state.telemetry.record_queries;
    let log = QueryLog::new();
    if recording {
        req.extensions_mut().insert(log.clone());
    }

    let resp = next.run(req).await;

    if recording && state.telemetry.slow_query_logging_enabled() {
        let records = log.take();
        if let Some(report) = summarize(&records, state.telemetry.slow_query_threshold_secs) {
            warn!("{report}");
        }
    }

    Ok(resp)
}
