//! Build workspace preparation.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Scratch directory owned by one build invocation.
///
/// All phases of one build run against the same workspace. Reusing a
/// directory across runs with different toggle sets is the caller's
/// choice and is not validated here.
#[derive(Debug, Clone)]
pub struct BuildWorkspace {
  root: PathBuf,
}

impl BuildWorkspace {
  /// Use `root` as the workspace, creating it if absent.
  pub async fn prepare(root: &Path) -> Result<Self, std::io::Error> {
    tokio::fs::create_dir_all(root).await?;
    debug!(workspace = %root.display(), "workspace ready");

    Ok(Self {
      root: root.to_path_buf(),
    })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn prepare_creates_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out").join("build");

    let workspace = BuildWorkspace::prepare(&root).await.unwrap();

    assert!(root.is_dir());
    assert_eq!(workspace.root(), root);
  }

  #[tokio::test]
  async fn prepare_keeps_existing_contents() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("CMakeCache.txt"), "stale").unwrap();

    BuildWorkspace::prepare(dir.path()).await.unwrap();

    assert!(dir.path().join("CMakeCache.txt").exists());
  }
}
