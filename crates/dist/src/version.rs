//! Engine version discovery.
//!
//! The engine's project file declares its version in the
//! `project(mcray VERSION x.y.z ...)` call. The version only names the
//! staging receipt, so discovery failures are warnings, never fatal: the
//! staged layout is keyed on the engine's canonical name.

use std::path::Path;

use tracing::warn;

/// Read the engine version from `<source_root>/CMakeLists.txt`.
///
/// Returns `None` (with a warning) when the project file is unreadable
/// or carries no `VERSION` clause.
pub fn discover_version(source_root: &Path) -> Option<String> {
  let project_file = source_root.join("CMakeLists.txt");

  let content = match std::fs::read_to_string(&project_file) {
    Ok(content) => content,
    Err(err) => {
      warn!(path = %project_file.display(), error = %err, "could not read project file");
      return None;
    }
  };

  let version = parse_project_version(&content);
  if version.is_none() {
    warn!(path = %project_file.display(), "project file declares no version");
  }
  version
}

/// Extract the version from the first `project(...)` call.
///
/// Accepts the multi-line form; the version token must be dotted digits.
pub fn parse_project_version(content: &str) -> Option<String> {
  let start = content.find("project(")?;
  let call = &content[start + "project(".len()..];
  let call = &call[..call.find(')')?];

  let mut tokens = call.split_whitespace();
  while let Some(token) = tokens.next() {
    if token == "VERSION" {
      let version = tokens.next()?;
      let valid = !version.is_empty()
        && version.chars().all(|c| c.is_ascii_digit() || c == '.')
        && version.chars().any(|c| c.is_ascii_digit());
      return valid.then(|| version.to_string());
    }
  }
  None
}
