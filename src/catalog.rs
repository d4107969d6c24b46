//! Offline rule catalog: an ordered, read-only list of error patterns.
//!
//! Built once at startup (built-in rules, then any rules from TOML config) and
//! shared as `Arc<RuleCatalog>`. Declaration order is precedence order: the first
//! matching rule wins.

use tracing::{error, info};

use crate::config::RuleCfg;
use crate::domain::ErrorRule;

#[derive(Clone, Debug, Default)]
pub struct RuleCatalog {
  rules: Vec<ErrorRule>,
}

/// (pattern, title, explanation, fix)
const BUILTIN_RULES: &[(&str, &str, &str, &str)] = &[
  (
    r"IndexError: list index out of range",
    "IndexError: List index out of range",
    "You are trying to access an element in a list at an index that doesn't exist. For example, trying to access index 5 in a list with only 3 items (indices 0, 1, 2).",
    "Check the length of your list using `len(list)`. Ensure your loop range or manual index is strictly less than the length of the list.",
  ),
  (
    r"IndentationError: expected an indented block",
    "IndentationError",
    "Python relies on indentation (whitespace) to define scope. You likely missed a tab or space after a statement ending in a colon (`:`) like `if`, `for`, or `def`.",
    "Add 4 spaces or 1 tab to the line immediately following the colon.",
  ),
  (
    r"TypeError: .* is not a function",
    "TypeError: is not a function",
    "In JavaScript, you are trying to call something as a function that is actually undefined, null, or a different data type (like a string or object).",
    "Console log the variable before the call to check its type. Ensure you didn't mistype the method name (e.g., `getElementByID` instead of `getElementById`).",
  ),
  (
    r"ReferenceError: .* is not defined",
    "ReferenceError",
    "You are trying to use a variable that hasn't been declared yet, or is out of scope.",
    "Check for typos in the variable name. Ensure the variable is declared with `var`, `let`, or `const` before use.",
  ),
  (
    r"Segmentation fault",
    "Segmentation Fault (C/C++)",
    "The program tried to access a memory location that it is not allowed to access. Common causes include dereferencing null pointers, accessing arrays out of bounds, or using freed memory.",
    "Check all pointer dereferences to ensure they aren't NULL. Verify array indices are within bounds (0 to size-1).",
  ),
  (
    r"java\.lang\.NullPointerException",
    "NullPointerException (Java)",
    "You are trying to use an object reference that has not been initialized (it is null). This often happens when calling a method on a null object.",
    "Check if your object is null before using it: `if (obj != null) { obj.method(); }`. Initialize your variables properly.",
  ),
  (
    r"error: expected ';' before",
    "Syntax Error: Missing Semicolon",
    "C, C++, and Java require statements to end with a semicolon (;). The compiler found a statement that didn't end with one.",
    "Look at the line number in the error message and the line *before* it. Add the missing semicolon.",
  ),
];

impl RuleCatalog {
  /// The built-in knowledge base, in precedence order.
  pub fn builtin() -> Self {
    let rules = BUILTIN_RULES
      .iter()
      .filter_map(|(pattern, title, explanation, fix)| match ErrorRule::new(pattern, title, explanation, fix) {
        Ok(rule) => Some(rule),
        Err(e) => {
          error!(target: "classify", %pattern, error = %e, "Built-in rule has an invalid pattern; skipping");
          None
        }
      })
      .collect();
    Self { rules }
  }

  #[cfg(test)]
  pub fn from_rules(rules: Vec<ErrorRule>) -> Self {
    Self { rules }
  }

  /// Built-in rules followed by configured ones. Invalid configured patterns are logged and skipped.
  pub fn with_config_rules(extra: &[RuleCfg]) -> Self {
    let mut catalog = Self::builtin();
    for rc in extra {
      match ErrorRule::new(&rc.pattern, &rc.title, &rc.explanation, &rc.fix) {
        Ok(rule) => catalog.rules.push(rule),
        Err(e) => {
          error!(target: "classify", pattern = %rc.pattern, title = %rc.title, error = %e, "Skipping configured rule: invalid pattern");
        }
      }
    }
    info!(target: "classify", rules = catalog.rules.len(), configured = extra.len(), "Rule catalog loaded");
    catalog
  }

  /// First rule (declaration order) whose pattern matches anywhere in `raw`.
  pub fn first_match(&self, raw: &str) -> Option<&ErrorRule> {
    self.rules.iter().find(|r| r.matches(raw))
  }

  #[cfg(test)]
  pub fn iter(&self) -> impl Iterator<Item = &ErrorRule> {
    self.rules.iter()
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_catalog_compiles_every_rule_in_order() {
    let c = RuleCatalog::builtin();
    assert_eq!(c.len(), BUILTIN_RULES.len());
    let titles: Vec<_> = c.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles.first(), Some(&"IndexError: List index out of range"));
    assert_eq!(titles.last(), Some(&"Syntax Error: Missing Semicolon"));
  }

  #[test]
  fn matches_inside_multiline_trace() {
    let c = RuleCatalog::builtin();
    let trace = "Exception in thread \"main\" java.lang.NullPointerException\n\tat Main.main(Main.java:5)";
    assert_eq!(c.first_match(trace).map(|r| r.title.as_str()), Some("NullPointerException (Java)"));

    let py = "Traceback (most recent call last):\n  File \"x.py\", line 2, in <module>\nindexerror: LIST INDEX OUT OF RANGE";
    assert_eq!(c.first_match(py).map(|r| r.title.as_str()), Some("IndexError: List index out of range"));
  }

  #[test]
  fn escaped_dot_is_literal() {
    let c = RuleCatalog::builtin();
    assert!(c.first_match("javaXlangXNullPointerException").is_none());
  }

  #[test]
  fn earlier_rule_wins_on_overlap() {
    let c = RuleCatalog::from_rules(vec![
      ErrorRule::new("error", "generic", "g", "g").unwrap(),
      ErrorRule::new("TypeError", "specific", "s", "s").unwrap(),
    ]);
    assert_eq!(c.first_match("TypeError: boom").unwrap().title, "generic");
  }

  #[test]
  fn configured_rules_append_and_invalid_ones_are_skipped() {
    let extra = vec![
      RuleCfg { pattern: "ModuleNotFoundError".into(), title: "Missing module".into(), explanation: "e".into(), fix: "f".into() },
      RuleCfg { pattern: "([".into(), title: "broken".into(), explanation: "e".into(), fix: "f".into() },
    ];
    let c = RuleCatalog::with_config_rules(&extra);
    assert_eq!(c.len(), BUILTIN_RULES.len() + 1);
    assert_eq!(c.iter().last().unwrap().title, "Missing module");
    assert!(c.first_match("ModuleNotFoundError: No module named 'numpy'").is_some());
  }

  #[test]
  fn empty_catalog_matches_nothing() {
    let c = RuleCatalog::default();
    assert!(c.is_empty());
    assert!(c.first_match("Segmentation fault").is_none());
  }
}
