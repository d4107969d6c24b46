//! Persisted store: snippets and the theme preference over a string-keyed medium.
//!
//! The medium is injected (`KvMedium`) so tests can use `MemoryKv`; the server
//! uses `FileKv`, a JSON object on disk rewritten atomically via temp file + rename.
//! Reads never fail outward: unreadable or corrupt data is logged and treated as empty.
//! All methods are synchronous; async callers use `Store::blocking`.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
};

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{CodeSnippet, Language, Theme};
use crate::util::is_blank;

pub const SNIPPETS_KEY: &str = "codenomad_snippets";
pub const THEME_KEY: &str = "codenomad_theme";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("storage I/O error on '{path}': {source}")]
  Io { path: PathBuf, source: std::io::Error },
  #[error("storage encoding error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("storage lock poisoned")]
  Poisoned,
  #[error("snippet needs a non-empty title and code")]
  ValidationRejected,
  #[error("storage task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

/// String-keyed durable medium (a localStorage equivalent).
pub trait KvMedium: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
  fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-memory medium; nothing survives the process.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryKv {
  map: std::sync::RwLock<BTreeMap<String, String>>,
}

#[cfg(test)]
impl KvMedium for MemoryKv {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let map = self.map.read().map_err(|_| StoreError::Poisoned)?;
    Ok(map.get(key).cloned())
  }

  fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
    let mut map = self.map.write().map_err(|_| StoreError::Poisoned)?;
    map.insert(key.to_string(), value);
    Ok(())
  }
}

/// File-backed medium: one JSON object `{ key: string }`.
pub struct FileKv {
  path: PathBuf,
  io: Mutex<()>,
}

impl FileKv {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), io: Mutex::new(()) }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn io_err(&self, source: std::io::Error) -> StoreError {
    StoreError::Io { path: self.path.clone(), source }
  }

  fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
    let raw = match std::fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
      Err(e) => return Err(self.io_err(e)),
    };
    match serde_json::from_str(&raw) {
      Ok(map) => Ok(map),
      Err(e) => {
        warn!(target: "store", path = %self.path.display(), error = %e, "Store file is corrupt; treating as empty");
        Ok(BTreeMap::new())
      }
    }
  }

  fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      std::fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
    }
    let tmp = self.path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(map)?).map_err(|e| self.io_err(e))?;
    std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
  }
}

impl KvMedium for FileKv {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let _guard = self.io.lock().map_err(|_| StoreError::Poisoned)?;
    Ok(self.read_map()?.remove(key))
  }

  fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
    let _guard = self.io.lock().map_err(|_| StoreError::Poisoned)?;
    let mut map = self.read_map()?;
    map.insert(key.to_string(), value);
    self.write_map(&map)
  }
}

/// Snippet collection + theme preference.
#[derive(Clone)]
pub struct Store {
  medium: Arc<dyn KvMedium>,
  // serializes read-modify-write on the snippet collection within this process
  write_lock: Arc<Mutex<()>>,
}

impl Store {
  pub fn new(medium: Arc<dyn KvMedium>) -> Self {
    Self { medium, write_lock: Arc::new(Mutex::new(())) }
  }

  #[cfg(test)]
  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryKv::default()))
  }

  pub fn open_file(path: impl Into<PathBuf>) -> Self {
    let kv = FileKv::new(path);
    info!(target: "store", path = %kv.path().display(), "Using file-backed store");
    Self::new(Arc::new(kv))
  }

  /// Run a store operation on the blocking pool. `FileKv` does synchronous file I/O
  /// under a mutex, so async handlers go through here rather than calling it inline.
  pub async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
  where
    F: FnOnce(&Store) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
  {
    let store = self.clone();
    tokio::task::spawn_blocking(move || op(&store)).await?
  }

  /// Stored order, no sorting. Corrupt/unreadable data yields an empty vec.
  fn load_raw(&self) -> Vec<CodeSnippet> {
    let raw = match self.medium.get(SNIPPETS_KEY) {
      Ok(Some(raw)) => raw,
      Ok(None) => return Vec::new(),
      Err(e) => {
        warn!(target: "store", error = %e, "Failed to read snippets; returning empty list");
        return Vec::new();
      }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
      warn!(target: "store", error = %e, "Failed to load snippets; returning empty list");
      Vec::new()
    })
  }

  fn save_raw(&self, snippets: &[CodeSnippet]) -> Result<(), StoreError> {
    self.medium.set(SNIPPETS_KEY, serde_json::to_string(snippets)?)
  }

  /// All snippets, newest first.
  pub fn list(&self) -> Vec<CodeSnippet> {
    let mut snippets = self.load_raw();
    snippets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    snippets
  }

  pub fn find_by_id(&self, id: &str) -> Option<CodeSnippet> {
    self.load_raw().into_iter().find(|s| s.id == id)
  }

  /// Replace the record with the same id in place, or append.
  #[instrument(level = "debug", skip(self, snippet), fields(id = %snippet.id))]
  pub fn upsert(&self, snippet: CodeSnippet) -> Result<(), StoreError> {
    let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
    let mut snippets = self.load_raw();
    match snippets.iter_mut().find(|s| s.id == snippet.id) {
      Some(existing) => {
        debug!(target: "store", "Replacing existing snippet");
        *existing = snippet;
      }
      None => snippets.push(snippet),
    }
    self.save_raw(&snippets)
  }

  /// Remove the record with this id; absent ids are a no-op.
  #[instrument(level = "debug", skip(self))]
  pub fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
    let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
    let mut snippets = self.load_raw();
    let before = snippets.len();
    snippets.retain(|s| s.id != id);
    if snippets.len() == before {
      debug!(target: "store", "Nothing to delete");
      return Ok(());
    }
    self.save_raw(&snippets)
  }

  /// The save action: validate, stamp id/createdAt, upsert.
  #[instrument(level = "info", skip(self, title, code), fields(title_len = title.len(), code_len = code.len(), ?language))]
  pub fn create_snippet(&self, title: &str, code: &str, language: Language) -> Result<CodeSnippet, StoreError> {
    if is_blank(title) || is_blank(code) {
      return Err(StoreError::ValidationRejected);
    }
    let snippet = CodeSnippet {
      id: Uuid::new_v4().to_string(),
      title: title.trim().to_string(),
      language,
      code: code.to_string(),
      tags: Vec::new(),
      created_at: chrono::Utc::now().timestamp_millis(),
    };
    self.upsert(snippet.clone())?;
    info!(target: "store", id = %snippet.id, "Snippet saved");
    Ok(snippet)
  }

  /// Stored theme, `dark` when unset or unrecognised.
  pub fn get_theme(&self) -> Theme {
    match self.medium.get(THEME_KEY) {
      Ok(Some(v)) => Theme::parse(&v).unwrap_or_default(),
      Ok(None) => Theme::default(),
      Err(e) => {
        warn!(target: "store", error = %e, "Failed to read theme; using default");
        Theme::default()
      }
    }
  }

  pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
    self.medium.set(THEME_KEY, theme.as_str().to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn snip(id: &str, created_at: i64, code: &str) -> CodeSnippet {
    CodeSnippet {
      id: id.into(),
      title: format!("title {id}"),
      language: Language::Python,
      code: code.into(),
      tags: vec![],
      created_at,
    }
  }

  #[test]
  fn upsert_then_list_round_trips() {
    let store = Store::in_memory();
    let s = snip("a", 1, "print(1)");
    store.upsert(s.clone()).unwrap();
    assert_eq!(store.list(), vec![s]);
  }

  #[test]
  fn upsert_same_id_replaces_instead_of_duplicating() {
    let store = Store::in_memory();
    store.upsert(snip("a", 1, "v1")).unwrap();
    store.upsert(snip("a", 1, "v2")).unwrap();
    let all = store.list();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].code, "v2");
  }

  #[test]
  fn list_is_newest_first() {
    let store = Store::in_memory();
    for (id, t) in [("x", 100), ("y", 300), ("z", 200)] {
      store.upsert(snip(id, t, "c")).unwrap();
    }
    let order: Vec<i64> = store.list().iter().map(|s| s.created_at).collect();
    assert_eq!(order, vec![300, 200, 100]);
  }

  #[test]
  fn delete_missing_id_leaves_collection_unchanged() {
    let store = Store::in_memory();
    store.upsert(snip("a", 1, "c")).unwrap();
    store.upsert(snip("b", 2, "c")).unwrap();
    let before = store.list();
    store.delete_by_id("nope").unwrap();
    assert_eq!(store.list(), before);

    store.delete_by_id("a").unwrap();
    assert_eq!(store.list().iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["b"]);
  }

  #[test]
  fn corrupt_snippet_data_reads_as_empty() {
    let kv = Arc::new(MemoryKv::default());
    kv.set(SNIPPETS_KEY, "{not json".into()).unwrap();
    let store = Store::new(kv);
    assert!(store.list().is_empty());
    // a later write replaces the corrupt payload
    store.upsert(snip("a", 1, "c")).unwrap();
    assert_eq!(store.list().len(), 1);
  }

  #[test]
  fn create_snippet_validates_and_stamps() {
    let store = Store::in_memory();
    assert!(matches!(store.create_snippet("  ", "x", Language::C), Err(StoreError::ValidationRejected)));
    assert!(matches!(store.create_snippet("t", "", Language::C), Err(StoreError::ValidationRejected)));
    assert!(store.list().is_empty());

    let s = store.create_snippet("Hello", "int main(){}", Language::C).unwrap();
    assert!(!s.id.is_empty());
    assert!(s.tags.is_empty());
    assert!(s.created_at > 0);
    assert_eq!(store.find_by_id(&s.id), Some(s));
  }

  #[test]
  fn theme_defaults_to_dark_and_persists() {
    let kv = Arc::new(MemoryKv::default());
    let store = Store::new(kv.clone());
    assert_eq!(store.get_theme(), Theme::Dark);
    store.set_theme(Theme::Light).unwrap();
    assert_eq!(store.get_theme(), Theme::Light);
    assert_eq!(kv.get(THEME_KEY).unwrap().as_deref(), Some("light"));

    kv.set(THEME_KEY, "sepia".into()).unwrap();
    assert_eq!(store.get_theme(), Theme::Dark);
  }

  #[test]
  fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let store = Store::open_file(&path);
    store.upsert(snip("a", 5, "fn main() {}")).unwrap();
    store.set_theme(Theme::Light).unwrap();
    drop(store);

    let reopened = Store::open_file(&path);
    assert_eq!(reopened.list().len(), 1);
    assert_eq!(reopened.get_theme(), Theme::Light);
  }

  #[test]
  fn corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "garbage").unwrap();

    let store = Store::open_file(&path);
    assert!(store.list().is_empty());
    assert_eq!(store.get_theme(), Theme::Dark);
  }

  #[tokio::test]
  async fn blocking_runs_file_io_on_the_blocking_pool() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_file(dir.path().join("store.json"));
    let saved = store.blocking(|s| s.create_snippet("t", "x = 1", Language::Python)).await.unwrap();
    let id = saved.id.clone();
    let found = store.blocking(move |s| Ok(s.find_by_id(&id))).await.unwrap();
    assert_eq!(found, Some(saved));

    let rejected = store.blocking(|s| s.create_snippet(" ", "x", Language::Python)).await;
    assert!(matches!(rejected, Err(StoreError::ValidationRejected)));
  }
}
