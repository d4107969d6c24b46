//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ClassificationResult, CodeSnippet, Language, Theme};
use crate::quiz::{QuizEvent, QuizView};
use crate::ui::{UiState, ViewState};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  Navigate {
    view: ViewState,
  },
  SetOnline {
    online: bool,
  },
  SetTheme {
    theme: Theme,
  },
  Explain {
    error: String,
  },
  Ask {
    context: String,
    question: String,
  },
  ListSnippets,
  SaveSnippet {
    title: String,
    code: String,
    #[serde(default)]
    language: Language,
  },
  DeleteSnippet {
    id: String,
  },
  QuizState,
  QuizSelect {
    option: usize,
  },
  QuizSubmit,
  QuizNext,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  Ui {
    state: UiState,
  },
  Classification {
    result: ClassificationResult,
  },
  AskReply {
    available: bool,
    text: Option<String>,
  },
  Snippets {
    snippets: Vec<CodeSnippet>,
  },
  SnippetSaved {
    snippet: CodeSnippet,
  },
  Quiz {
    view: QuizView,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<QuizEvent>,
  },
  Error {
    message: String,
  },
}

//
// HTTP request/response DTOs
//

fn default_online() -> bool {
  true
}

#[derive(Debug, Deserialize)]
pub struct ExplainIn {
  pub error: String,
  /// Client connectivity as sampled by the browser at submit time.
  #[serde(default = "default_online")]
  pub online: bool,
}

#[derive(Debug, Deserialize)]
pub struct AskIn {
  pub context: String,
  pub question: String,
}
#[derive(Debug, Serialize)]
pub struct AskOut {
  pub available: bool,
  pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SnippetIn {
  pub title: String,
  pub code: String,
  #[serde(default)]
  pub language: Language,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeBody {
  pub theme: Theme,
}

#[derive(Debug, Deserialize)]
pub struct DocsQuery {
  pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuizSelectIn {
  pub option: usize,
}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOut {
  pub session_id: String,
  pub view: QuizView,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub event: Option<QuizEvent>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
  pub ok: bool,
  pub ai_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
  pub message: String,
}
