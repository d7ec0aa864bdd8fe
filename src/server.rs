// ZEN HTTP Surface
// Copyright (c) 2026 Xing_The_Creator | ZEN

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt; // For oneshot
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::agent::composer::SessionComposer;
use crate::session::{SessionRequest, SessionResponse};

pub struct ServerState {
    pub composer: SessionComposer,
    /// Landing page assets; `None` runs API-only
    pub static_dir: Option<PathBuf>,
}

impl ServerState {
    pub fn new(composer: SessionComposer, static_dir: Option<PathBuf>) -> Self {
        Self {
            composer,
            static_dir,
        }
    }
}

pub type AppState = Arc<ServerState>;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub provider: Option<&'static str>,
}

pub fn create_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(index).post(create_session))
        .route("/create-session", post(create_session))
        .route("/health", get(health));

    if let Some(dir) = &state.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = create_router(state);

    let display_addr = if addr.ip().is_unspecified() {
        format!("127.0.0.1:{}", addr.port())
    } else {
        addr.to_string()
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 ZEN Session API running on http://{}", display_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("[SERVER] Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown requested.");
}

async fn index(State(state): State<AppState>, req: Request) -> Response {
    if let Some(page) = state
        .static_dir
        .as_ref()
        .map(|dir| dir.join("index.html"))
        .filter(|page| page.is_file())
    {
        return match ServeFile::new(page).oneshot(req).await {
            Ok(res) => res.into_response(),
            Err(err) => {
                error!("[SERVER] ServeFile error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };
    }

    Json(json!({ "message": "ASMR API is running" })).into_response()
}

async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> Json<SessionResponse> {
    info!("[SERVER] Session requested: '{}'", payload.theme);
    Json(state.composer.create_session(&payload.theme).await)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "zen-core",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.composer.provider_name(),
    })
}
