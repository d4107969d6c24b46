//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! A connection is one UI surface: it owns its `UiState` (view, connectivity,
//! theme) and its quiz progress. Messages are handled one at a time, so at most
//! one classification is in flight per connection.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::quiz::{QuizAction, QuizState};
use crate::state::AppState;
use crate::ui::{self, UiEvent, UiState};

/// Per-connection state.
struct Session {
  ui: UiState,
  quiz: QuizState,
}

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "codenomad_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "codenomad_backend", "WebSocket connected");
  // Assume online until the client reports otherwise.
  let mut session = Session { ui: UiState::new(true, get_theme(&state).await), quiz: QuizState::default() };

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "codenomad_backend", ?incoming, "WS received");
            handle_client_ws(incoming, &state, &mut session).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "codenomad_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => {
        let _ = socket.send(Message::Pong(payload)).await;
      }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "codenomad_backend", "WebSocket disconnected");
}

async fn snippets_reply(state: &AppState) -> ServerWsMessage {
  match list_snippets(state).await {
    Ok(snippets) => ServerWsMessage::Snippets { snippets },
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

fn quiz_reply(state: &AppState, quiz: &QuizState, event: Option<crate::quiz::QuizEvent>) -> ServerWsMessage {
  match quiz_view(state, quiz) {
    Some(view) => ServerWsMessage::Quiz { view, event },
    None => ServerWsMessage::Error { message: "The quiz has no questions.".into() },
  }
}

fn quiz_action(state: &AppState, session: &mut Session, action: QuizAction) -> ServerWsMessage {
  match quiz_local(state, &mut session.quiz, action) {
    Ok(step) => quiz_reply(state, &session.quiz, step.event),
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip(state, session))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session: &mut Session) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Navigate { view } => {
      session.ui = ui::reduce(session.ui, UiEvent::Navigate(view));
      ServerWsMessage::Ui { state: session.ui }
    }

    ClientWsMessage::SetOnline { online } => {
      session.ui = ui::reduce(session.ui, UiEvent::ConnectivityChanged(online));
      info!(target: "codenomad_backend", %online, "Client connectivity changed");
      ServerWsMessage::Ui { state: session.ui }
    }

    ClientWsMessage::SetTheme { theme } => match set_theme(state, theme).await {
      Ok(()) => {
        session.ui = ui::reduce(session.ui, UiEvent::ThemeChanged(theme));
        ServerWsMessage::Ui { state: session.ui }
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::Explain { error } => {
      // connectivity is sampled here, once per request
      match do_explain(state, &error, session.ui.is_online).await {
        Some(result) => ServerWsMessage::Classification { result },
        None => ServerWsMessage::Error { message: "Paste an error message to analyze.".into() },
      }
    }

    ClientWsMessage::Ask { context, question } => {
      let text = do_ask(state, &context, &question).await;
      ServerWsMessage::AskReply { available: text.is_some(), text }
    }

    ClientWsMessage::ListSnippets => snippets_reply(state).await,

    ClientWsMessage::SaveSnippet { title, code, language } => match save_snippet(state, &title, &code, language).await {
      Ok(snippet) => ServerWsMessage::SnippetSaved { snippet },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::DeleteSnippet { id } => match delete_snippet(state, &id).await {
      Ok(()) => snippets_reply(state).await,
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::QuizState => quiz_reply(state, &session.quiz, None),
    ClientWsMessage::QuizSelect { option } => quiz_action(state, session, QuizAction::Select(option)),
    ClientWsMessage::QuizSubmit => quiz_action(state, session, QuizAction::Submit),
    ClientWsMessage::QuizNext => quiz_action(state, session, QuizAction::Next),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::RuleCatalog;
  use crate::classify::tests::RecordingExplainer;
  use crate::domain::{ResultSource, Theme};
  use crate::store::Store;
  use crate::ui::ViewState;

  fn setup(reply: Option<&str>) -> (AppState, Arc<RecordingExplainer>, Session) {
    let ex = RecordingExplainer::new(reply);
    let state = AppState::from_parts(RuleCatalog::builtin(), ex.clone(), Store::in_memory());
    let session = Session { ui: UiState::new(true, Theme::Dark), quiz: QuizState::default() };
    (state, ex, session)
  }

  fn parse(json: &str) -> ClientWsMessage {
    serde_json::from_str(json).unwrap()
  }

  #[tokio::test]
  async fn explain_uses_session_connectivity() {
    let (state, ex, mut session) = setup(Some("remote says hi"));

    let reply = handle_client_ws(parse(r#"{"type":"explain","error":"KeyError: 'x'"}"#), &state, &mut session).await;
    assert!(matches!(reply, ServerWsMessage::Classification { ref result } if result.source == ResultSource::Ai));

    handle_client_ws(parse(r#"{"type":"set_online","online":false}"#), &state, &mut session).await;
    let reply = handle_client_ws(parse(r#"{"type":"explain","error":"KeyError: 'x'"}"#), &state, &mut session).await;
    assert!(matches!(reply, ServerWsMessage::Classification { ref result } if result.source == ResultSource::Unknown));
    assert_eq!(ex.explain_calls(), 1);
  }

  #[tokio::test]
  async fn blank_explain_is_an_error_reply() {
    let (state, ex, mut session) = setup(Some("x"));
    let reply = handle_client_ws(parse(r#"{"type":"explain","error":"   "}"#), &state, &mut session).await;
    assert!(matches!(reply, ServerWsMessage::Error { .. }));
    assert_eq!(ex.explain_calls(), 0);
  }

  #[tokio::test]
  async fn navigate_and_theme_update_ui_state() {
    let (state, _, mut session) = setup(None);
    handle_client_ws(parse(r#"{"type":"navigate","view":"snippets"}"#), &state, &mut session).await;
    let reply = handle_client_ws(parse(r#"{"type":"set_theme","theme":"light"}"#), &state, &mut session).await;
    match reply {
      ServerWsMessage::Ui { state: ui } => {
        assert_eq!(ui.current_view, ViewState::Snippets);
        assert_eq!(ui.theme, Theme::Light);
      }
      other => panic!("unexpected reply: {other:?}"),
    }
    assert_eq!(state.store.get_theme(), Theme::Light);
  }

  #[tokio::test]
  async fn snippet_save_list_delete() {
    let (state, _, mut session) = setup(None);
    let reply = handle_client_ws(
      parse(r#"{"type":"save_snippet","title":"hello","code":"print('hi')","language":"python"}"#),
      &state,
      &mut session,
    )
    .await;
    let id = match reply {
      ServerWsMessage::SnippetSaved { snippet } => snippet.id,
      other => panic!("unexpected reply: {other:?}"),
    };

    let rejected = handle_client_ws(parse(r#"{"type":"save_snippet","title":"","code":"x"}"#), &state, &mut session).await;
    assert!(matches!(rejected, ServerWsMessage::Error { .. }));

    let msg = format!(r#"{{"type":"delete_snippet","id":"{id}"}}"#);
    let reply = handle_client_ws(parse(&msg), &state, &mut session).await;
    assert!(matches!(reply, ServerWsMessage::Snippets { ref snippets } if snippets.is_empty()));
  }

  #[tokio::test]
  async fn quiz_flow_rejects_double_submit() {
    let (state, _, mut session) = setup(None);
    let right = state.quiz[0].correct_index;
    handle_client_ws(ClientWsMessage::QuizSelect { option: right }, &state, &mut session).await;
    let reply = handle_client_ws(ClientWsMessage::QuizSubmit, &state, &mut session).await;
    assert!(matches!(reply, ServerWsMessage::Quiz { ref view, .. } if view.score == 1 && view.revealed));

    let again = handle_client_ws(ClientWsMessage::QuizSubmit, &state, &mut session).await;
    assert!(matches!(again, ServerWsMessage::Error { .. }));
    assert_eq!(session.quiz.score, 1);
  }

  #[test]
  fn unknown_message_type_fails_to_parse() {
    assert!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"launch_missiles"}"#).is_err());
  }
}
