//! Loading application configuration (prompts, storage path, extra error rules) from TOML.
//!
//! See `AppConfig` and `Prompts` for expected schema. Every section is optional.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_DATA_PATH: &str = "./data/codenomad.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config file '{path}': {source}")]
  Read { path: String, source: std::io::Error },
  #[error("failed to parse config file '{path}': {source}")]
  Parse { path: String, source: toml::de::Error },
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub storage: StorageCfg,
  #[serde(default)]
  pub rules: Vec<RuleCfg>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StorageCfg {
  #[serde(default)]
  pub path: Option<String>,
}

/// Extra offline rule accepted in TOML. Appended after the built-in catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct RuleCfg {
  pub pattern: String,
  pub title: String,
  pub explanation: String,
  pub fix: String,
}

/// Prompts used by the remote explainer.
/// Override them in TOML if you need to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system: String,
  pub explain_error_template: String, // {error}
  pub ask_template: String,           // {context}, {question}
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system: "You are a senior developer assistant.".into(),
      explain_error_template: "Explain the following programming error concisely.\n1. What does it mean?\n2. Why did it happen?\n3. Provide a code example of how to fix it.\n\nError Message:\n{error}".into(),
      ask_template: "Context: {context}\n\nUser Question: {question}\n\nAnswer briefly and accurately for a developer audience.".into(),
    }
  }
}

impl AppConfig {
  /// Resolve the store path: env var wins over TOML, TOML over the default.
  pub fn data_path(&self) -> PathBuf {
    std::env::var("CODENOMAD_DATA_PATH")
      .ok()
      .or_else(|| self.storage.path.clone())
      .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string())
      .into()
  }
}

pub fn parse_config(path: &str, raw: &str) -> Result<AppConfig, ConfigError> {
  toml::from_str::<AppConfig>(raw).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
}

pub fn load_config_file(path: &str) -> Result<AppConfig, ConfigError> {
  let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
  parse_config(path, &raw)
}

/// Attempt to load `AppConfig` from CODENOMAD_CONFIG_PATH. On any IO/parse error, logs and returns defaults.
pub fn load_config_from_env() -> AppConfig {
  let Ok(path) = std::env::var("CODENOMAD_CONFIG_PATH") else {
    return AppConfig::default();
  };
  match load_config_file(&path) {
    Ok(cfg) => {
      info!(target: "codenomad_backend", %path, extra_rules = cfg.rules.len(), "Loaded app config (TOML)");
      cfg
    }
    Err(e) => {
      error!(target: "codenomad_backend", %path, error = %e, "Config unusable; falling back to defaults");
      AppConfig::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_toml_gives_defaults() {
    let cfg = parse_config("mem", "").unwrap();
    assert!(cfg.rules.is_empty());
    assert!(cfg.prompts.explain_error_template.contains("{error}"));
    assert!(cfg.storage.path.is_none());
  }

  #[test]
  fn partial_prompts_keep_other_defaults() {
    let raw = r#"
[prompts]
system = "Be terse."

[storage]
path = "/tmp/nomad.json"

[[rules]]
pattern = "ModuleNotFoundError"
title = "Missing module"
explanation = "Python cannot find the module."
fix = "pip install it."
"#;
    let cfg = parse_config("mem", raw).unwrap();
    assert_eq!(cfg.prompts.system, "Be terse.");
    assert!(cfg.prompts.ask_template.contains("{question}"));
    assert_eq!(cfg.storage.path.as_deref(), Some("/tmp/nomad.json"));
    assert_eq!(cfg.rules.len(), 1);
    assert_eq!(cfg.rules[0].title, "Missing module");
  }

  #[test]
  fn bad_toml_is_a_parse_error() {
    assert!(matches!(parse_config("mem", "[[rules]]\npattern = 1"), Err(ConfigError::Parse { .. })));
  }

  #[test]
  fn missing_file_is_a_read_error() {
    assert!(matches!(load_config_file("/definitely/not/here.toml"), Err(ConfigError::Read { .. })));
  }
}
