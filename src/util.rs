//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Values are substituted in a single pass, so a value containing `{other}`
/// is never expanded again.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;
  'outer: while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let tail = &rest[open..];
    for (k, v) in pairs {
      let needle = format!("{{{}}}", k);
      if tail.starts_with(&needle) {
        out.push_str(v);
        rest = &tail[needle.len()..];
        continue 'outer;
      }
    }
    out.push('{');
    rest = &tail[1..];
  }
  out.push_str(rest);
  out
}

/// True if the text is empty after trimming whitespace.
pub fn is_blank(s: &str) -> bool {
  s.trim().is_empty()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge stack traces or provider responses.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_known_keys_once() {
    let out = fill_template("Q: {question}\nC: {context}", &[("context", "{question}"), ("question", "why?")]);
    assert_eq!(out, "Q: why?\nC: {question}");
  }

  #[test]
  fn fill_template_keeps_unknown_braces() {
    assert_eq!(fill_template("int main() { return {x}; }", &[("y", "1")]), "int main() { return {x}; }");
  }

  #[test]
  fn blank_detection() {
    assert!(is_blank(""));
    assert!(is_blank("  \n\t "));
    assert!(!is_blank(" x "));
  }

  #[test]
  fn trunc_respects_char_boundaries() {
    let s = "ééééé";
    let t = trunc_for_log(s, 3);
    assert!(t.starts_with('é'));
    assert!(t.ends_with("(10 bytes total)"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }
}
