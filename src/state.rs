//! Application state shared by HTTP and WebSocket handlers.
//!
//! This module owns:
//!   - the classifier (rule catalog + remote explainer)
//!   - the persisted store (snippets, theme)
//!   - the static reference content (docs, quiz, interview notes)
//!   - HTTP quiz sessions (by id), capped with least-recently-used eviction

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::catalog::RuleCatalog;
use crate::classify::Classifier;
use crate::config::load_config_from_env;
use crate::domain::{DocItem, InterviewTopic, QuizQuestion};
use crate::gateway::{Explainer, OpenAiExplainer};
use crate::quiz::{reduce, QuizAction, QuizError, QuizState, QuizStep};
use crate::seeds::{interview_topics, offline_docs, practice_quiz};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
  pub classifier: Classifier,
  pub store: Store,
  pub docs: Arc<Vec<DocItem>>,
  pub quiz: Arc<Vec<QuizQuestion>>,
  pub interview: Arc<Vec<InterviewTopic>>,
  pub quiz_sessions: Arc<RwLock<QuizSessions>>,
  /// Live HTTP quiz sessions kept before the least recently used one is evicted.
  pub quiz_session_cap: usize,
}

pub const DEFAULT_QUIZ_SESSION_CAP: usize = 1024;

struct SessionEntry {
  state: QuizState,
  last_used: u64,
}

/// HTTP quiz sessions keyed by id. `tick` is a logical clock bumped on every
/// create or action, used to find the least recently used entry.
#[derive(Default)]
pub struct QuizSessions {
  entries: HashMap<String, SessionEntry>,
  tick: u64,
}

impl QuizSessions {
  fn touch(&mut self) -> u64 {
    self.tick += 1;
    self.tick
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  fn evict_down_to(&mut self, cap: usize) -> Vec<String> {
    let mut evicted = Vec::new();
    while self.entries.len() > cap {
      let Some(oldest) = self.entries.iter().min_by_key(|(_, e)| e.last_used).map(|(id, _)| id.clone()) else {
        break;
      };
      self.entries.remove(&oldest);
      evicted.push(oldest);
    }
    evicted
  }
}

impl AppState {
  /// Build state from env: load config, build the catalog, open the store, init the explainer.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let cfg = load_config_from_env();
    let catalog = RuleCatalog::with_config_rules(&cfg.rules);
    let explainer = OpenAiExplainer::from_env(cfg.prompts.clone());
    let store = Store::open_file(cfg.data_path());
    Self::from_parts(catalog, Arc::new(explainer), store)
  }

  /// Wire explicit dependencies; used by `new` and by tests with fakes.
  pub fn from_parts(catalog: RuleCatalog, explainer: Arc<dyn Explainer>, store: Store) -> Self {
    if catalog.is_empty() {
      warn!(target: "classify", "Rule catalog is empty; every lookup will miss the offline tier");
    }
    let state = Self {
      classifier: Classifier::new(Arc::new(catalog), explainer),
      store,
      docs: Arc::new(offline_docs()),
      quiz: Arc::new(practice_quiz()),
      interview: Arc::new(interview_topics()),
      quiz_sessions: Arc::new(RwLock::new(QuizSessions::default())),
      quiz_session_cap: DEFAULT_QUIZ_SESSION_CAP,
    };
    info!(
      target: "codenomad_backend",
      rules = state.classifier.catalog().len(),
      docs = state.docs.len(),
      questions = state.quiz.len(),
      topics = state.interview.len(),
      "Startup content inventory"
    );
    state
  }

  pub fn ai_enabled(&self) -> bool {
    self.classifier.explainer().is_enabled()
  }

  /// Start a fresh quiz session and return its id. Evicts the least recently
  /// used sessions once the cap is exceeded.
  #[instrument(level = "debug", skip(self))]
  pub async fn new_quiz_session(&self) -> String {
    let id = Uuid::new_v4().to_string();
    let mut sessions = self.quiz_sessions.write().await;
    let last_used = sessions.touch();
    sessions.entries.insert(id.clone(), SessionEntry { state: QuizState::default(), last_used });
    for old in sessions.evict_down_to(self.quiz_session_cap.max(1)) {
      info!(target: "quiz", id = %old, "Quiz session evicted");
    }
    info!(target: "quiz", %id, live = sessions.len(), "Quiz session started");
    id
  }

  pub async fn quiz_session(&self, id: &str) -> Option<QuizState> {
    self.quiz_sessions.read().await.entries.get(id).map(|e| e.state)
  }

  /// Drop a session. Returns whether it existed.
  #[instrument(level = "debug", skip(self))]
  pub async fn end_quiz_session(&self, id: &str) -> bool {
    let removed = self.quiz_sessions.write().await.entries.remove(id).is_some();
    if removed {
      info!(target: "quiz", %id, "Quiz session ended");
    }
    removed
  }

  /// Apply one quiz action to a stored session under the write lock.
  /// `None` if the session does not exist; rejected actions leave it unchanged.
  #[instrument(level = "debug", skip(self))]
  pub async fn apply_quiz_action(&self, id: &str, action: QuizAction) -> Option<Result<QuizStep, QuizError>> {
    let mut sessions = self.quiz_sessions.write().await;
    let last_used = sessions.touch();
    let entry = sessions.entries.get_mut(id)?;
    entry.last_used = last_used;
    let result = reduce(entry.state, action, &self.quiz);
    if let Ok(step) = &result {
      entry.state = step.state;
    }
    Some(result)
  }
}
