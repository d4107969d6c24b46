//! Remote explainer gateway: the boundary around the external text-generation provider.
//!
//! `Explainer` is the seam the classifier depends on. `OpenAiExplainer` is the real
//! implementation, a minimal chat.completions client. Every provider failure (missing
//! key, transport, HTTP status, empty text) is caught here, logged, and downgraded
//! to `None`. Nothing propagates to callers.
//!
//! NOTE: We never log the API key or full payloads, only sizes and short previews.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::Prompts;
use crate::util::{fill_template, is_blank, trunc_for_log};

/// Provider-level failures. Never leaves this module except through logs.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
  #[error("no API key configured")]
  MissingKey,
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("provider HTTP {status}: {message}")]
  Provider { status: u16, message: String },
  #[error("provider returned an empty response")]
  EmptyResponse,
}

/// Free-text explanations from a remote model. `None` means unavailable.
#[async_trait]
pub trait Explainer: Send + Sync {
  /// Explain a raw error message: meaning, cause, corrected example.
  async fn explain(&self, error_message: &str) -> Option<String>;

  /// Free-form follow-up question about some context.
  async fn ask(&self, context: &str, question: &str) -> Option<String>;

  fn is_enabled(&self) -> bool {
    true
  }
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !is_blank(k))?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    Self::new(api_key, base_url, model)
  }

  pub fn new(api_key: String, base_url: String, model: String) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .map_err(|e| error!(target: "gateway", error = %e, "Failed to build HTTP client"))
      .ok()?;
    Some(Self { client, api_key, base_url, model })
  }

  /// Plain-text chat completion, one round trip. Returns the text verbatim.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model, user_len = user.len()))]
  async fn chat_plain(&self, system: &str, user: &str) -> Result<String, GatewayError> {
    if is_blank(&self.api_key) {
      return Err(GatewayError::MissingKey);
    }
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature: 0.2,
    };

    let start = Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "codenomad-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(GatewayError::Provider { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(target: "gateway", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Provider usage");
    }
    let text = body
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .unwrap_or_default();
    debug!(target: "gateway", elapsed = ?start.elapsed(), text_len = text.len(), "Provider response received");

    if is_blank(&text) {
      return Err(GatewayError::EmptyResponse);
    }
    Ok(text)
  }
}

/// `Explainer` backed by an optional OpenAI client. Without a client every call is unavailable.
#[derive(Clone)]
pub struct OpenAiExplainer {
  client: Option<OpenAI>,
  prompts: Prompts,
}

impl OpenAiExplainer {
  pub fn new(client: Option<OpenAI>, prompts: Prompts) -> Self {
    Self { client, prompts }
  }

  pub fn from_env(prompts: Prompts) -> Self {
    let client = OpenAI::from_env();
    match &client {
      Some(oa) => info!(target: "codenomad_backend", base_url = %oa.base_url, model = %oa.model, "Remote explainer enabled."),
      None => info!(target: "codenomad_backend", "Remote explainer disabled (no OPENAI_API_KEY). Offline rules only."),
    }
    Self::new(client, prompts)
  }

  async fn try_explain(&self, error_message: &str) -> Result<String, GatewayError> {
    let oa = self.client.as_ref().ok_or(GatewayError::MissingKey)?;
    let user = fill_template(&self.prompts.explain_error_template, &[("error", error_message)]);
    oa.chat_plain(&self.prompts.system, &user).await
  }

  async fn try_ask(&self, context: &str, question: &str) -> Result<String, GatewayError> {
    let oa = self.client.as_ref().ok_or(GatewayError::MissingKey)?;
    let user = fill_template(&self.prompts.ask_template, &[("context", context), ("question", question)]);
    oa.chat_plain(&self.prompts.system, &user).await
  }
}

#[async_trait]
impl Explainer for OpenAiExplainer {
  #[instrument(level = "info", skip(self, error_message), fields(error_len = error_message.len()))]
  async fn explain(&self, error_message: &str) -> Option<String> {
    match self.try_explain(error_message).await {
      Ok(text) => Some(text),
      Err(GatewayError::MissingKey) => {
        debug!(target: "gateway", "explain skipped: no API key");
        None
      }
      Err(e) => {
        error!(target: "gateway", error = %e, preview = %trunc_for_log(error_message, 80), "explain failed; reporting unavailable");
        None
      }
    }
  }

  #[instrument(level = "info", skip(self, context, question), fields(context_len = context.len(), question_len = question.len()))]
  async fn ask(&self, context: &str, question: &str) -> Option<String> {
    match self.try_ask(context, question).await {
      Ok(text) => Some(text),
      Err(GatewayError::MissingKey) => {
        debug!(target: "gateway", "ask skipped: no API key");
        None
      }
      Err(e) => {
        error!(target: "gateway", error = %e, "ask failed; reporting unavailable");
        None
      }
    }
  }

  fn is_enabled(&self) -> bool {
    self.client.is_some()
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq {
  role: String,
  content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)]
  usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessageResp,
}
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)]
  prompt_tokens: Option<u32>,
  #[serde(default)]
  completion_tokens: Option<u32>,
  #[serde(default)]
  total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
  use serde_json::{json, Value};
  use tokio::net::TcpListener;

  use super::*;

  #[derive(Clone)]
  struct Fake {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<Value>>>,
  }

  async fn completions(State(fake): State<Fake>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    fake.seen.lock().unwrap().push(body);
    (fake.status, Json(fake.reply.clone()))
  }

  /// Serve a fake `/chat/completions` on an ephemeral port; returns base URL and captured request bodies.
  async fn spawn_provider(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
      .route("/v1/chat/completions", post(completions))
      .with_state(Fake { status, reply, seen: seen.clone() });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1", addr), seen)
  }

  fn explainer_for(base_url: String) -> OpenAiExplainer {
    let oa = OpenAI::new("test-key".into(), base_url, "test-model".into()).unwrap();
    OpenAiExplainer::new(Some(oa), Prompts::default())
  }

  fn completion(text: &str) -> Value {
    json!({ "choices": [{ "message": { "content": text } }], "usage": { "total_tokens": 3 } })
  }

  #[tokio::test]
  async fn explain_returns_provider_text_verbatim_and_embeds_error() {
    let (url, seen) = spawn_provider(StatusCode::OK, completion("  It means X.\n")).await;
    let ex = explainer_for(url);

    let out = ex.explain("KeyError: 'name'").await;
    assert_eq!(out.as_deref(), Some("  It means X.\n"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["model"], "test-model");
    let user = seen[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("KeyError: 'name'"));
    assert!(user.contains("What does it mean?"));
  }

  #[tokio::test]
  async fn ask_embeds_context_and_question() {
    let (url, seen) = spawn_provider(StatusCode::OK, completion("Because.")).await;
    let ex = explainer_for(url);

    assert_eq!(ex.ask("def f(): pass", "why pass?").await.as_deref(), Some("Because."));
    let user = seen.lock().unwrap()[0]["messages"][1]["content"].as_str().unwrap().to_string();
    assert!(user.contains("Context: def f(): pass"));
    assert!(user.contains("User Question: why pass?"));
  }

  #[tokio::test]
  async fn empty_text_is_unavailable() {
    let (url, _) = spawn_provider(StatusCode::OK, completion("   ")).await;
    assert!(explainer_for(url).explain("boom").await.is_none());
  }

  #[tokio::test]
  async fn provider_error_status_is_unavailable() {
    let (url, seen) = spawn_provider(StatusCode::UNAUTHORIZED, json!({ "error": { "message": "bad key" } })).await;
    let ex = explainer_for(url);
    assert!(ex.explain("boom").await.is_none());
    assert!(ex.ask("c", "q").await.is_none());
    // no retries: one request per call
    assert_eq!(seen.lock().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn unreachable_provider_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    assert!(explainer_for(format!("http://{}/v1", addr)).explain("boom").await.is_none());
  }

  #[tokio::test]
  async fn missing_client_is_unavailable() {
    let ex = OpenAiExplainer::new(None, Prompts::default());
    assert!(!ex.is_enabled());
    assert!(ex.explain("boom").await.is_none());
    assert!(ex.ask("c", "q").await.is_none());
  }

  #[test]
  fn extracts_openai_error_message() {
    assert_eq!(extract_openai_error(r#"{"error":{"message":"quota"}}"#).as_deref(), Some("quota"));
    assert!(extract_openai_error("<html>").is_none());
  }
}
