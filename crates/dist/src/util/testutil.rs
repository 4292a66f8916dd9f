//! Test utilities for mcray-dist.
//!
//! Stub external tools for tests that drive the build pipeline without a
//! real build tool installed. Each stub appends its argument vector to a
//! log file next to itself, so tests can assert on what was (or was not)
//! invoked.

use std::path::{Path, PathBuf};

/// Write an executable stub named `name` into `dir`.
///
/// The stub appends its arguments to `<dir>/<name>.log` and exits with
/// `exit_code`. Returns the stub's path.
#[cfg(unix)]
pub fn stub_tool(dir: &Path, name: &str, exit_code: i32) -> PathBuf {
  let log = dir.join(format!("{name}.log"));
  let body = format!("echo \"$@\" >> \"{}\"\nexit {}\n", log.display(), exit_code);
  stub_tool_script(dir, name, &body)
}

#[cfg(windows)]
pub fn stub_tool(dir: &Path, name: &str, exit_code: i32) -> PathBuf {
  let log = dir.join(format!("{name}.log"));
  let body = format!("@echo %* >> \"{}\"\r\n@exit /b {}\r\n", log.display(), exit_code);
  stub_tool_script(dir, name, &body)
}

/// Write an executable stub with a caller-supplied script body.
///
/// The body runs under `/bin/sh`; stubs that need to fabricate build
/// outputs (libraries, executables) provide their own commands.
#[cfg(unix)]
pub fn stub_tool_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

#[cfg(windows)]
pub fn stub_tool_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  let path = dir.join(format!("{name}.bat"));
  std::fs::write(&path, body).unwrap();
  path
}

/// Contents of a stub's invocation log, empty if the stub never ran.
pub fn read_tool_log(dir: &Path, name: &str) -> String {
  std::fs::read_to_string(dir.join(format!("{name}.log"))).unwrap_or_default()
}
