//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
  routing::{get, post},
  Router,
};
use tower_http::{
  cors::{Any, CorsLayer},
  services::{ServeDir, ServeFile},
  trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
  // Static files with SPA fallback
  let static_service = ServeDir::new("./static")
    .append_index_html_on_directories(true)
    .not_found_service(ServeFile::new("./static/index.html"));

  Router::new()
    // WebSocket
    .route("/ws", get(ws::ws_upgrade))
    // HTTP API
    .route("/api/v1/health", get(http::http_health))
    .route("/api/v1/explain", post(http::http_post_explain))
    .route("/api/v1/ask", post(http::http_post_ask))
    .route("/api/v1/snippets", get(http::http_list_snippets).post(http::http_create_snippet))
    .route(
      "/api/v1/snippets/:id",
      get(http::http_get_snippet).put(http::http_put_snippet).delete(http::http_delete_snippet),
    )
    .route("/api/v1/theme", get(http::http_get_theme).put(http::http_put_theme))
    .route("/api/v1/docs", get(http::http_get_docs))
    .route("/api/v1/docs/:id", get(http::http_get_doc))
    .route("/api/v1/interview", get(http::http_get_interview))
    .route("/api/v1/quiz", post(http::http_new_quiz))
    .route("/api/v1/quiz/:id", get(http::http_get_quiz).delete(http::http_end_quiz))
    .route("/api/v1/quiz/:id/select", post(http::http_quiz_select))
    .route("/api/v1/quiz/:id/submit", post(http::http_quiz_submit))
    .route("/api/v1/quiz/:id/next", post(http::http_quiz_next))
    // State + CORS + HTTP tracing
    .with_state(state)
    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    // Frontend fallback
    .fallback_service(static_service)
}
