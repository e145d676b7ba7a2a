//! exam-scout binary entrypoint.
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use exam_scout::{build_state, metrics::Metrics, router, ScoutConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn is_dev_env() -> bool {
    if cfg!(debug_assertions) {
        return true;
    }
    let env = std::env::var("SHUTTLE_ENV").unwrap_or_default();
    matches!(
        env.to_ascii_lowercase().as_str(),
        "local" | "development" | "dev"
    )
}

/// Compact scout/pyq logs, only when SCOUT_DEV_LOG=1 in a dev environment.
fn enable_dev_tracing() {
    if std::env::var("SCOUT_DEV_LOG").as_deref() != Ok("1") || !is_dev_env() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scout=info,pyq=info,api=info,warn"));

    // Shuttle may already have installed a subscriber; keep whichever came first.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = ScoutConfig::load_default()?;
    let state = build_state(cfg)?;

    let mut app = router(state);
    match Metrics::init() {
        Ok(m) => app = app.merge(m.router()),
        Err(e) => tracing::warn!(error = %e, "metrics endpoint disabled"),
    }

    Ok(app.into())
}
