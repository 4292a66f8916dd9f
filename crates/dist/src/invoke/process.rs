//! Child-process execution for build phases.

use std::process::ExitStatus;

use tokio::process::Command;
use tracing::debug;

/// Run an external tool to completion.
///
/// Stdio is inherited: the tool's own output is the user-visible
/// diagnostic stream, and this layer adds no translation over it. The
/// caller decides what a nonzero exit status means.
pub(crate) async fn run_tool(program: &str, args: &[String]) -> std::io::Result<ExitStatus> {
  debug!(program = %program, args = ?args, "spawning tool");

  let status = Command::new(program).args(args).status().await?;

  debug!(program = %program, code = ?status.code(), "tool exited");
  Ok(status)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::stub_tool;

  #[tokio::test]
  #[cfg(unix)]
  async fn reports_exit_status() {
    let dir = tempfile::tempdir().unwrap();

    let ok = stub_tool(dir.path(), "tool-ok", 0);
    let status = run_tool(&ok.display().to_string(), &[]).await.unwrap();
    assert!(status.success());

    let bad = stub_tool(dir.path(), "tool-bad", 3);
    let status = run_tool(&bad.display().to_string(), &[]).await.unwrap();
    assert_eq!(status.code(), Some(3));
  }

  #[tokio::test]
  async fn launch_failure_is_an_error() {
    let result = run_tool("definitely-not-a-real-tool-mcray", &[]).await;
    assert!(result.is_err());
  }
}
