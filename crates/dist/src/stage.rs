//! Artifact staging into the package tree.
//!
//! After a successful compile the workspace holds the engine's shared
//! library (under `lib64` or `lib`, the build tool does not say which)
//! and its executable (under `bin`). Staging copies both into the fixed
//! locations the packaged runtime expects. The workspace itself is never
//! mutated.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use mcray_platform::libdir::library_dir;
use mcray_platform::os::host_shared_lib_suffix;

use crate::consts::ENGINE_NAME;

/// Errors from staging build outputs into the package tree.
#[derive(Debug, Error)]
pub enum StageError {
  /// An expected build output does not exist in the workspace.
  ///
  /// Raised before anything is written; a missing library here would
  /// otherwise surface much later as a runtime binding failure.
  #[error("missing build artifact: {path}")]
  MissingArtifact { path: PathBuf },

  /// Copying into the package tree failed.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// One staged (workspace source, package destination) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
  pub source: PathBuf,
  pub dest: PathBuf,
}

/// The artifacts a successful stage produced.
#[derive(Debug, Clone)]
pub struct StagedArtifacts {
  /// The engine shared library inside the package tree.
  pub shared_lib: StagedArtifact,
  /// The engine executable inside the package tree.
  pub executable: StagedArtifact,
}

impl StagedArtifacts {
  pub fn all(&self) -> [&StagedArtifact; 2] {
    [&self.shared_lib, &self.executable]
  }
}

/// File name of the engine shared library for a given suffix.
pub fn shared_lib_name(suffix: &str) -> String {
  format!("lib{ENGINE_NAME}.{suffix}")
}

/// Package directory the runtime bindings load the shared library from.
pub fn package_lib_dir(package_root: &Path) -> PathBuf {
  package_root.join(ENGINE_NAME).join("lib")
}

/// Package directory that holds the engine executable.
///
/// The executable lives inside the package tree, not in any
/// console-scripts area, so relocation tooling can rewrite its dynamic
/// library search paths before a generated launcher exposes it.
pub fn package_bin_dir(package_root: &Path) -> PathBuf {
  package_root.join(ENGINE_NAME).join("bin")
}

/// Copy the built shared library and executable into the package tree.
///
/// Steps, each a precondition of the next:
/// 1. resolve the workspace library directory (`lib64` when present,
///    `lib` otherwise),
/// 2. resolve the shared-library suffix for the host OS,
/// 3. copy `libmcray.<suffix>` into the package lib directory,
/// 4. copy `bin/mcray` into the package bin directory.
///
/// A missing source fails with [`StageError::MissingArtifact`] before any
/// destination write, and later steps are not attempted. Staging twice
/// over an unchanged workspace produces byte-identical artifacts.
pub async fn stage(workspace: &Path, package_root: &Path) -> Result<StagedArtifacts, StageError> {
  let suffix = host_shared_lib_suffix();
  let lib_name = shared_lib_name(suffix);

  let lib_src = library_dir(workspace).join(&lib_name);
  let lib_dest = copy_atomic(&lib_src, &package_lib_dir(package_root), &lib_name).await?;

  let exe_src = workspace.join("bin").join(ENGINE_NAME);
  let exe_dest = copy_atomic(&exe_src, &package_bin_dir(package_root), ENGINE_NAME).await?;

  info!(
    lib = %lib_dest.display(),
    bin = %exe_dest.display(),
    "artifacts staged"
  );

  Ok(StagedArtifacts {
    shared_lib: StagedArtifact {
      source: lib_src,
      dest: lib_dest,
    },
    executable: StagedArtifact {
      source: exe_src,
      dest: exe_dest,
    },
  })
}

/// Copy `src` into `dest_dir/name` without ever exposing a partial file.
///
/// The bytes land in a uniquely named temp file inside the destination
/// directory and are renamed into place; a rename within one directory is
/// atomic. The temp file is cleaned up if anything fails in between.
async fn copy_atomic(src: &Path, dest_dir: &Path, name: &str) -> Result<PathBuf, StageError> {
  if !fs::try_exists(src).await? {
    return Err(StageError::MissingArtifact { path: src.to_path_buf() });
  }

  fs::create_dir_all(dest_dir).await?;

  let tmp = tempfile::Builder::new()
    .prefix(".mcray-stage-")
    .tempfile_in(dest_dir)?
    .into_temp_path();

  fs::copy(src, &tmp).await?;

  let dest = dest_dir.join(name);
  tmp.persist(&dest).map_err(|e| StageError::Io(e.error))?;

  debug!(src = %src.display(), dest = %dest.display(), "artifact copied");
  Ok(dest)
}
