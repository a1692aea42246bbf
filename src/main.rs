use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &custodian::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        daily_cadence_secs = cfg.maintenance.daily_cadence_secs,
        weekly_cadence_secs = cfg.maintenance.weekly_cadence_secs,
        record_queries = cfg.telemetry.record_queries,
        debug_log = cfg.telemetry.debug_log,
        "custodian starting"
    );

    let store = custodian::db::spawn(&cfg.basic.database_url).await;
    let state = custodian::server::CustodianState::new(store, cfg);

    // Recurring reap registration is idempotent; wiring twice is a no-op.
    let weekly =
        Duration::from_secs(u64::try_from(cfg.maintenance.weekly_cadence_secs.max(1)).unwrap_or(604_800));
    state
        .reap_schedule
        .ensure_scheduled(state.reaper.clone(), weekly);

    let app = custodian::server::custodian_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { /* ... */ },
        _ = terminate => { /* ... */ },
    }
}
