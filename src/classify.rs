//! Error classification: offline rule → remote explainer → unknown.
//!
//! Tier 1 is deterministic and side-effect free. Tier 2 only runs when the caller
//! says the client is online, and a single gateway failure is terminal for that
//! request (no retry). Tier 3 always produces a result.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::catalog::RuleCatalog;
use crate::domain::{ClassificationResult, ResultSource};
use crate::gateway::Explainer;
use crate::util::is_blank;

pub const AI_TITLE: &str = "AI Analysis";
pub const AI_FIX: &str = "See explanation above.";
pub const UNKNOWN_TITLE: &str = "Unknown Error";
pub const UNKNOWN_EXPLANATION: &str =
  "This error pattern isn't in our offline database yet, and we couldn't reach the AI service.";
pub const UNKNOWN_FIX: &str = "Try checking your syntax or connectivity.";

#[derive(Clone)]
pub struct Classifier {
  catalog: Arc<RuleCatalog>,
  explainer: Arc<dyn Explainer>,
}

impl Classifier {
  pub fn new(catalog: Arc<RuleCatalog>, explainer: Arc<dyn Explainer>) -> Self {
    Self { catalog, explainer }
  }

  pub fn catalog(&self) -> &RuleCatalog {
    &self.catalog
  }

  pub fn explainer(&self) -> &Arc<dyn Explainer> {
    &self.explainer
  }

  /// Tier 1 only: first matching catalog rule, tagged `offline`.
  pub fn classify_offline(&self, raw: &str) -> Option<ClassificationResult> {
    self.catalog.first_match(raw).map(ClassificationResult::from_rule)
  }

  /// Full pipeline. Returns `None` for blank input (nothing is classified).
  #[instrument(level = "info", skip(self, raw), fields(raw_len = raw.len(), %online))]
  pub async fn classify(&self, raw: &str, online: bool) -> Option<ClassificationResult> {
    if is_blank(raw) {
      debug!(target: "classify", "Blank input; refusing to classify");
      return None;
    }

    if let Some(hit) = self.classify_offline(raw) {
      info!(target: "classify", title = %hit.title, source = "offline", "Offline rule matched");
      return Some(hit);
    }

    if online {
      // a blank reply is treated the same as no reply
      if let Some(text) = self.explainer.explain(raw).await.filter(|t| !is_blank(t)) {
        info!(target: "classify", text_len = text.len(), source = "ai", "Remote explainer answered");
        return Some(ClassificationResult {
          title: AI_TITLE.into(),
          explanation: text,
          fix: AI_FIX.into(),
          source: ResultSource::Ai,
        });
      }
      warn!(target: "classify", "Remote explainer unavailable; returning unknown");
    } else {
      debug!(target: "classify", "Offline; skipping remote tier");
    }

    Some(unknown_result())
  }
}

pub fn unknown_result() -> ClassificationResult {
  ClassificationResult {
    title: UNKNOWN_TITLE.into(),
    explanation: UNKNOWN_EXPLANATION.into(),
    fix: UNKNOWN_FIX.into(),
    source: ResultSource::Unknown,
  }
}
