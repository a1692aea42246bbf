use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use custodian::config::Config;
use custodian::server::{CustodianState, custodian_router};
use serde_json::{Value, json};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tokio::fs;
use tower::ServiceExt;

/// Collects formatted log output so tests can assert on emitted lines.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

async fn spawn_app(tag: &str, cfg: Config) -> (Router, CustodianState, PathBuf) {
    let tmp_dir = std::env::temp_dir();
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    tag.hash(&mut hasher);
    let db_path = tmp_dir.join(format!("test_router_{}_{}.sqlite", tag, hasher.finish()));
    let database_url = format!("sqlite:{}", db_path.to_str().unwrap());

    let store = custodian::db::spawn(&database_url).await;
    let state = CustodianState::new(store, &cfg);
    (custodian_router(state.clone()), state, db_path)
}

async fn cleanup(db_path: PathBuf) {
    let wal_path = PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm_path = PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = fs::remove_file(&wal_path).await;
    let _ = fs::remove_file(&shm_path).await;
    fs::remove_file(&db_path).await.unwrap();
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_and_unknown_routes() {
    let (app, _state, db_path) = spawn_app("healthz", Config::default()).await;

    let resp = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup(db_path).await;
}

#[tokio::test]
async fn option_crud_roundtrip_with_cache_readthrough() {
    let mut cfg = Config::default();
    // Recording on, emission off: exercises the query log path silently.
    cfg.telemetry.record_queries = true;
    let (app, _state, db_path) = spawn_app("crud", cfg).await;

    let put = Request::put("/options/site_name")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"value": "ops journal", "autoload": true}).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(put).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .clone()
        .oneshot(Request::get("/options/site_name").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "site_name");
    assert_eq!(body["value"], "ops journal");
    assert_eq!(body["cached"], false);

    // Second read is served from the fast cache.
    let resp = app
        .clone()
        .oneshot(Request::get("/options/site_name").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["cached"], true);

    let resp = app
        .clone()
        .oneshot(
            Request::delete("/options/site_name")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(Request::get("/options/site_name").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "OPTION_NOT_FOUND");

    cleanup(db_path).await;
}

#[tokio::test]
async fn first_request_runs_the_daily_pass() {
    let (app, state, db_path) = spawn_app("daily_pass", Config::default()).await;

    state
        .store
        .upsert("rewrite_rules", "rules", true)
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let row = state.store.get("rewrite_rules").await.unwrap().unwrap();
    assert!(!row.autoload);

    let resp = app
        .oneshot(
            Request::get("/maintenance/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert!(body["autoload_optimize_last_run"].as_i64().unwrap() > 0);
    assert_eq!(body["reap_scheduled"], false);

    cleanup(db_path).await;
}

#[tokio::test]
async fn manual_reap_reports_counts() {
    let (app, state, db_path) = spawn_app("manual_reap", Config::default()).await;

    state
        .store
        .upsert("_transient_orphan", "cached", true)
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::post("/maintenance/reap")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    // Either the lifecycle hook's daily pass or this trigger removed it.
    let via_trigger = body["orphaned"].as_u64().unwrap();
    assert!(via_trigger <= 1);
    assert!(state.store.get("_transient_orphan").await.unwrap().is_none());

    cleanup(db_path).await;
}

#[tokio::test]
async fn hot_keys_warm_once_and_survive_store_deletes() {
    let mut cfg = Config::default();
    cfg.maintenance.hot_option_keys = vec!["template".to_string()];
    let (app, state, db_path) = spawn_app("warm_once", cfg).await;

    state
        .store
        .upsert("template", "twentynineteen", true)
        .await
        .unwrap();

    // First request warms the configured keys.
    let resp = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        state.hot_cache.get("template").as_deref(),
        Some("twentynineteen")
    );

    // Deleting the backing row does not evict the warmed value, and the warm
    // does not re-run on later requests.
    state.store.delete("template").await.unwrap();
    let resp = app
        .clone()
        .oneshot(Request::get("/options/template").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["cached"], true);
    assert_eq!(body["value"], "twentynineteen");

    cleanup(db_path).await;
}

#[tokio::test]
async fn slow_query_block_is_emitted_when_both_flags_are_on() {
    let mut cfg = Config::default();
    cfg.telemetry.record_queries = true;
    cfg.telemetry.debug_log = true;
    // Any recorded query is slower than a zero threshold.
    cfg.telemetry.slow_query_threshold_secs = 0.0;
    let (app, state, db_path) = spawn_app("slow_emit", cfg).await;

    state
        .store
        .upsert("site_name", "ops journal", true)
        .await
        .unwrap();

    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(capture.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);

    let resp = app
        .oneshot(Request::get("/options/site_name").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let output = capture.contents();
    assert!(output.contains("=== SLOW QUERIES DETECTED ==="));
    assert!(output.contains("Slow Query #1"));
    assert!(output.contains("=== END SLOW QUERIES ==="));

    drop(guard);
    cleanup(db_path).await;
}

#[tokio::test]
async fn slow_query_block_stays_silent_without_debug_log() {
    let mut cfg = Config::default();
    cfg.telemetry.record_queries = true;
    cfg.telemetry.debug_log = false;
    cfg.telemetry.slow_query_threshold_secs = 0.0;
    let (app, state, db_path) = spawn_app("slow_silent", cfg).await;

    state
        .store
        .upsert("site_name", "ops journal", true)
        .await
        .unwrap();

    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(capture.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);

    let resp = app
        .oneshot(Request::get("/options/site_name").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(!capture.contents().contains("=== SLOW QUERIES DETECTED ==="));

    drop(guard);
    cleanup(db_path).await;
}
