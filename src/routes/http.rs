//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters sizes and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::CodeSnippet;
use crate::logic::*;
use crate::protocol::*;
use crate::quiz::{QuizAction, QuizError, QuizState, QuizStep};
use crate::state::AppState;
use crate::store::StoreError;

type ApiError = (StatusCode, Json<ErrorOut>);
type ApiResult<T> = Result<T, ApiError>;

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
  (status, Json(ErrorOut { message: message.into() }))
}

fn store_error(e: StoreError) -> ApiError {
  match e {
    StoreError::ValidationRejected => api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    other => api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
  }
}

fn quiz_error(e: QuizError) -> ApiError {
  api_error(StatusCode::CONFLICT, e.to_string())
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, ai_enabled: state.ai_enabled() })
}

#[instrument(level = "info", skip(state, body), fields(error_len = body.error.len(), online = body.online))]
pub async fn http_post_explain(State(state): State<Arc<AppState>>, Json(body): Json<ExplainIn>) -> ApiResult<impl IntoResponse> {
  let result = do_explain(&state, &body.error, body.online)
    .await
    .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Paste an error message to analyze."))?;
  info!(target: "classify", source = ?result.source, "HTTP explain served");
  Ok(Json(result))
}

#[instrument(level = "info", skip(state, body), fields(question_len = body.question.len()))]
pub async fn http_post_ask(State(state): State<Arc<AppState>>, Json(body): Json<AskIn>) -> impl IntoResponse {
  let text = do_ask(&state, &body.context, &body.question).await;
  Json(AskOut { available: text.is_some(), text })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_snippets(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
  let snippets = list_snippets(&state).await.map_err(store_error)?;
  Ok(Json(snippets))
}

#[instrument(level = "info", skip(state, body), fields(title_len = body.title.len(), code_len = body.code.len()))]
pub async fn http_create_snippet(State(state): State<Arc<AppState>>, Json(body): Json<SnippetIn>) -> ApiResult<impl IntoResponse> {
  let snippet = save_snippet(&state, &body.title, &body.code, body.language).await.map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(snippet)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_snippet(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
  find_snippet(&state, &id)
    .await
    .map_err(store_error)?
    .map(Json)
    .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown snippet: {id}")))
}

/// Full replace by id; the path id wins over any id in the body.
#[instrument(level = "info", skip(state, body))]
pub async fn http_put_snippet(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<CodeSnippet>,
) -> ApiResult<impl IntoResponse> {
  let snippet = replace_snippet(&state, CodeSnippet { id, ..body }).await.map_err(store_error)?;
  Ok(Json(snippet))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_snippet(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<StatusCode> {
  delete_snippet(&state, &id).await.map_err(store_error)?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_theme(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(ThemeBody { theme: get_theme(&state).await })
}

#[instrument(level = "info", skip(state))]
pub async fn http_put_theme(State(state): State<Arc<AppState>>, Json(body): Json<ThemeBody>) -> ApiResult<impl IntoResponse> {
  set_theme(&state, body.theme).await.map_err(store_error)?;
  Ok(Json(body))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_docs(State(state): State<Arc<AppState>>, Query(q): Query<DocsQuery>) -> impl IntoResponse {
  Json(find_docs(&state, q.q.as_deref()).into_iter().cloned().collect::<Vec<_>>())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_doc(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
  state
    .docs
    .iter()
    .find(|d| d.id == id)
    .cloned()
    .map(Json)
    .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown doc: {id}")))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_interview(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.interview.as_ref().clone())
}

fn quiz_out(state: &AppState, session_id: String, qs: &QuizState, step: Option<&QuizStep>) -> ApiResult<Json<QuizOut>> {
  let view = quiz_view(state, qs).ok_or_else(|| quiz_error(QuizError::EmptyQuiz))?;
  Ok(Json(QuizOut { session_id, view, event: step.and_then(|s| s.event) }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_new_quiz(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
  let id = state.new_quiz_session().await;
  let out = quiz_out(&state, id, &QuizState::default(), None)?;
  Ok((StatusCode::CREATED, out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<QuizOut>> {
  let qs = state
    .quiz_session(&id)
    .await
    .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown quiz session: {id}")))?;
  quiz_out(&state, id, &qs, None)
}

#[instrument(level = "info", skip(state))]
pub async fn http_end_quiz(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<StatusCode> {
  if state.end_quiz_session(&id).await {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(api_error(StatusCode::NOT_FOUND, format!("Unknown quiz session: {id}")))
  }
}

async fn apply(state: &AppState, id: String, action: QuizAction) -> ApiResult<Json<QuizOut>> {
  let step = state
    .apply_quiz_action(&id, action)
    .await
    .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown quiz session: {id}")))?
    .map_err(quiz_error)?;
  log_quiz_step(&step);
  quiz_out(state, id, &step.state, Some(&step))
}

#[instrument(level = "info", skip(state))]
pub async fn http_quiz_select(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<QuizSelectIn>,
) -> ApiResult<Json<QuizOut>> {
  apply(&state, id, QuizAction::Select(body.option)).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_quiz_submit(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<QuizOut>> {
  apply(&state, id, QuizAction::Submit).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_quiz_next(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<QuizOut>> {
  apply(&state, id, QuizAction::Next).await
}
