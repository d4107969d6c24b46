//! CodeNomad · offline-first coding companion backend
//!
//! - Axum HTTP + WebSocket API
//! - Error explainer: offline rule catalog, optional OpenAI fallback
//! - Snippet vault + theme persisted to a local JSON store
//! - Practice quiz, offline docs and interview notes
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                   : u16 (default 3000)
//!   OPENAI_API_KEY         : enables the remote explainer if present
//!   OPENAI_BASE_URL        : default "https://api.openai.com/v1"
//!   OPENAI_MODEL           : default "gpt-4o-mini"
//!   CODENOMAD_CONFIG_PATH  : path to TOML config (prompts, storage path, extra rules)
//!   CODENOMAD_DATA_PATH    : store file, default "./data/codenomad.json"
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

mod catalog;
mod classify;
mod config;
mod domain;
mod gateway;
mod logic;
mod protocol;
mod quiz;
mod routes;
mod seeds;
mod state;
mod store;
mod telemetry;
mod ui;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (catalog, explainer, store, static content).
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "codenomad_backend", %addr, ai_enabled = state.ai_enabled(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "codenomad_backend", "Shutdown signal received");
    })
    .await?;
  Ok(())
}
