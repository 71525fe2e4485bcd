//! API routes and shared state.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use turingjudge_core::{AnswerRequest, AnswerResponse, GameHandler, StartResponse};

use crate::error::ApiResult;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    game: Arc<GameHandler>,
}

impl AppState {
    pub fn new(game: GameHandler) -> Self {
        Self {
            game: Arc::new(game),
        }
    }

    pub fn game(&self) -> &GameHandler {
        &self.game
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/start`
pub async fn start_game(State(state): State<AppState>) -> ApiResult<Json<StartResponse>> {
    let response = state.game().start().await?;
    Ok(Json(response))
}

/// `POST /api/answer`
pub async fn submit_answer(
    State(state): State<AppState>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> ApiResult<Json<AnswerResponse>> {
    let Json(request) = payload?;
    let response = state.game().answer(request).await?;
    Ok(Json(response))
}

/// Build the router. Requests that match no API route fall through to
/// `static_dir` when one is given.
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/api/start", post(start_game))
        .route("/api/answer", post(submit_answer));

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
