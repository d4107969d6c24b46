//! Domain models: error rules and classification results, saved snippets,
//! quiz questions, and the static reference content (docs, interview notes).

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// One offline rule: a pattern tested against the whole raw error text.
/// The pattern is compiled once, case-insensitive and unanchored.
#[derive(Clone, Debug)]
pub struct ErrorRule {
  pub pattern: Regex,
  pub title: String,
  pub explanation: String,
  pub fix: String,
}

impl ErrorRule {
  pub fn new(pattern: &str, title: &str, explanation: &str, fix: &str) -> Result<Self, regex::Error> {
    let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
    Ok(Self {
      pattern,
      title: title.to_string(),
      explanation: explanation.to_string(),
      fix: fix.to_string(),
    })
  }

  pub fn matches(&self, raw: &str) -> bool {
    self.pattern.is_match(raw)
  }
}

/// Which tier produced a classification.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
  Offline, // matched a catalog rule
  Ai,      // remote explainer answered
  Unknown, // terminal fallback
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationResult {
  pub title: String,
  pub explanation: String,
  pub fix: String,
  pub source: ResultSource,
}

impl ClassificationResult {
  pub fn from_rule(rule: &ErrorRule) -> Self {
    Self {
      title: rule.title.clone(),
      explanation: rule.explanation.clone(),
      fix: rule.fix.clone(),
      source: ResultSource::Offline,
    }
  }
}

/// Closed set of language tags shared by snippets, docs and quiz questions.
/// Anything unrecognised is read back as `Other`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  Python,
  Javascript,
  Html,
  Css,
  C,
  Cpp,
  Java,
  #[default]
  #[serde(other)]
  Other,
}

/// A saved code snippet. Field names stay camelCase on the wire and on disk.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnippet {
  pub id: String,
  pub title: String,
  pub language: Language,
  pub code: String,
  #[serde(default)]
  pub tags: Vec<String>, // always empty at creation, nothing filters on it yet
  pub created_at: i64,   // unix millis, sort key (newest first)
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  Light,
  #[default]
  Dark,
}

impl Theme {
  pub fn parse(s: &str) -> Option<Theme> {
    match s {
      "light" => Some(Theme::Light),
      "dark" => Some(Theme::Dark),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Theme::Light => "light",
      Theme::Dark => "dark",
    }
  }
}

/// Multiple-choice question. `question` may embed inline code between backticks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub id: String,
  pub language: Language,
  pub question: String,
  pub options: Vec<String>,
  pub correct_index: usize,
  pub explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocItem {
  pub id: String,
  pub language: Language,
  pub title: String,
  pub category: String,
  pub content: String, // markdown
  pub keywords: Vec<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TopicCategory {
  #[serde(rename = "DSA")]
  Dsa,
  Behavioral,
  #[serde(rename = "System Design")]
  SystemDesign,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterviewTopic {
  pub id: String,
  pub title: String,
  pub category: TopicCategory,
  pub content: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rule_matches_case_insensitively_anywhere() {
    let rule = ErrorRule::new(r"Segmentation fault", "Segfault", "e", "f").unwrap();
    assert!(rule.matches("$ ./a.out\nsegmentation FAULT (core dumped)"));
    assert!(!rule.matches("segmentation"));
  }

  #[test]
  fn malformed_pattern_is_an_error() {
    assert!(ErrorRule::new(r"(unclosed", "t", "e", "f").is_err());
  }

  #[test]
  fn snippet_uses_camel_case_and_unknown_language_is_other() {
    let json = r#"{"id":"1","title":"t","language":"rust","code":"fn main(){}","createdAt":5}"#;
    let s: CodeSnippet = serde_json::from_str(json).unwrap();
    assert_eq!(s.language, Language::Other);
    assert!(s.tags.is_empty());
    let back = serde_json::to_value(&s).unwrap();
    assert_eq!(back["createdAt"], 5);
    assert_eq!(back["language"], "other");
  }

  #[test]
  fn theme_parse() {
    assert_eq!(Theme::parse("light"), Some(Theme::Light));
    assert_eq!(Theme::parse("LIGHT"), None);
    assert_eq!(Theme::default(), Theme::Dark);
  }

  #[test]
  fn source_tags_serialize_lowercase() {
    assert_eq!(serde_json::to_string(&ResultSource::Ai).unwrap(), "\"ai\"");
    assert_eq!(serde_json::to_string(&ResultSource::Unknown).unwrap(), "\"unknown\"");
  }
}
