//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Classifying raw error text (offline rules, remote explainer, unknown)
//!   - Free-form follow-up questions to the remote explainer
//!   - Snippet save/delete with validation and failure logging
//!   - Doc search and quiz views over the static content

use tracing::{debug, error, info, instrument, warn};

use crate::domain::{ClassificationResult, CodeSnippet, DocItem, Language, Theme};
use crate::quiz::{self, QuizAction, QuizError, QuizState, QuizStep, QuizView};
use crate::seeds::search_docs;
use crate::state::AppState;
use crate::store::StoreError;
use crate::util::is_blank;

/// `None` when the input is blank; otherwise always a rendered result.
#[instrument(level = "info", skip(state, raw), fields(raw_len = raw.len(), %online))]
pub async fn do_explain(state: &AppState, raw: &str, online: bool) -> Option<ClassificationResult> {
  let result = state.classifier.classify(raw, online).await;
  if let Some(r) = &result {
    info!(target: "classify", source = ?r.source, title = %r.title, "Classification served");
  }
  result
}

#[instrument(level = "info", skip(state, context, question), fields(context_len = context.len(), question_len = question.len()))]
pub async fn do_ask(state: &AppState, context: &str, question: &str) -> Option<String> {
  if is_blank(question) {
    debug!(target: "gateway", "Blank question; not asking");
    return None;
  }
  state.classifier.explainer().ask(context, question).await
}

pub async fn list_snippets(state: &AppState) -> Result<Vec<CodeSnippet>, StoreError> {
  state.store.blocking(|s| Ok(s.list())).await
}

pub async fn find_snippet(state: &AppState, id: &str) -> Result<Option<CodeSnippet>, StoreError> {
  let id = id.to_string();
  state.store.blocking(move |s| Ok(s.find_by_id(&id))).await
}

pub async fn save_snippet(state: &AppState, title: &str, code: &str, language: Language) -> Result<CodeSnippet, StoreError> {
  let (title, code) = (title.to_string(), code.to_string());
  state.store.blocking(move |s| s.create_snippet(&title, &code, language)).await.map_err(|e| {
    match &e {
      StoreError::ValidationRejected => warn!(target: "store", "Snippet rejected: empty title or code"),
      other => error!(target: "store", error = %other, "Snippet save failed"),
    }
    e
  })
}

pub async fn replace_snippet(state: &AppState, snippet: CodeSnippet) -> Result<CodeSnippet, StoreError> {
  if is_blank(&snippet.title) || is_blank(&snippet.code) {
    warn!(target: "store", id = %snippet.id, "Snippet replace rejected: empty title or code");
    return Err(StoreError::ValidationRejected);
  }
  let id = snippet.id.clone();
  let stored = snippet.clone();
  state.store.blocking(move |s| s.upsert(stored)).await.map_err(|e| {
    error!(target: "store", %id, error = %e, "Snippet upsert failed");
    e
  })?;
  Ok(snippet)
}

pub async fn delete_snippet(state: &AppState, id: &str) -> Result<(), StoreError> {
  let owned = id.to_string();
  state.store.blocking(move |s| s.delete_by_id(&owned)).await.map_err(|e| {
    error!(target: "store", %id, error = %e, "Snippet delete failed");
    e
  })
}

/// Stored theme; a failed storage task falls back to the default like a failed read.
pub async fn get_theme(state: &AppState) -> Theme {
  state.store.blocking(|s| Ok(s.get_theme())).await.unwrap_or_else(|e| {
    error!(target: "store", error = %e, "Theme read failed; using default");
    Theme::default()
  })
}

pub async fn set_theme(state: &AppState, theme: Theme) -> Result<(), StoreError> {
  state.store.blocking(move |s| s.set_theme(theme)).await.map_err(|e| {
    error!(target: "store", theme = theme.as_str(), error = %e, "Theme save failed");
    e
  })
}

pub fn find_docs<'a>(state: &'a AppState, term: Option<&str>) -> Vec<&'a DocItem> {
  search_docs(&state.docs, term.unwrap_or_default())
}

pub fn quiz_view(state: &AppState, qs: &QuizState) -> Option<QuizView> {
  quiz::view(qs, &state.quiz)
}

/// Apply an action to a connection-local quiz state, updating it on success.
pub fn quiz_local(state: &AppState, qs: &mut QuizState, action: QuizAction) -> Result<QuizStep, QuizError> {
  let step = quiz::reduce(*qs, action, &state.quiz)?;
  *qs = step.state;
  log_quiz_step(&step);
  Ok(step)
}

pub fn log_quiz_step(step: &QuizStep) {
  if let Some(event) = &step.event {
    info!(target: "quiz", index = step.state.current_index, score = step.state.score, ?event, "Quiz step");
  }
}
