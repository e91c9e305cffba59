use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use topdown_core::error::SkillError;
use topdown_core::skill::{SkillHandler, SkillRequest, SkillResponse};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = topdown_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let handler = match SkillHandler::from_settings(&settings) {
        Ok(handler) => handler,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "skill configuration invalid");
            return Err(e);
        }
    };

    let state = AppState {
        handler: Arc::new(handler),
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "skill api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/skill", post(handle_skill))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    handler: Arc<SkillHandler>,
}

async fn handle_skill(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SkillResponse>, StatusCode> {
    let req = serde_json::from_slice::<SkillRequest>(&body).map_err(|e| {
        tracing::warn!(error = %e, "rejecting malformed skill request");
        StatusCode::BAD_REQUEST
    })?;

    match state.handler.handle(&req, chrono::Utc::now()).await {
        Ok(res) => Ok(Json(res)),
        Err(SkillError::ApplicationMismatch(app_id)) => {
            tracing::warn!(%app_id, "rejecting request for another application");
            Err(StatusCode::FORBIDDEN)
        }
        Err(e) => {
            sentry_anyhow::capture_anyhow(&anyhow::Error::new(e));
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &topdown_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
