//! Acceleration-module compilation.
//!
//! The engine ships a family of numeric kernels as standalone C sources.
//! Each unit compiles independently into one loadable module placed next
//! to its source. No workspace and no feature matrix are involved; the
//! only knob is the compiler program itself.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use mcray_platform::os::host_shared_lib_suffix;

use crate::invoke::process::run_tool;

/// Errors from compiling an acceleration module.
#[derive(Debug, Error)]
pub enum AccelError {
  /// The compiler could not be spawned at all.
  #[error("failed to launch compiler {program}: {source}")]
  CompilerLaunch {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The compiler exited nonzero for one unit.
  #[error("compiling {unit} failed with exit code {code:?}")]
  CompileFailed { unit: PathBuf, code: Option<i32> },

  /// Enumerating the source units failed.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Output path of a unit's compiled module: same stem, next to the
/// source, host shared-library suffix.
pub fn module_path(source: &Path) -> PathBuf {
  source.with_extension(host_shared_lib_suffix())
}

/// Compiler arguments for one unit.
pub fn compile_args(source: &Path, out: &Path) -> Vec<String> {
  vec![
    "-O2".to_string(),
    "-shared".to_string(),
    "-fPIC".to_string(),
    source.display().to_string(),
    "-o".to_string(),
    out.display().to_string(),
  ]
}

/// Compile one source unit into its loadable module.
pub async fn compile_unit(cc: &str, source: &Path) -> Result<PathBuf, AccelError> {
  let out = module_path(source);
  let args = compile_args(source, &out);

  info!(unit = %source.display(), module = %out.display(), "compiling acceleration module");

  let status = run_tool(cc, &args).await.map_err(|err| AccelError::CompilerLaunch {
    program: cc.to_string(),
    source: err,
  })?;

  if !status.success() {
    return Err(AccelError::CompileFailed {
      unit: source.to_path_buf(),
      code: status.code(),
    });
  }

  Ok(out)
}

/// The `.c` units under `dir`, sorted for a deterministic target order.
pub fn discover_units(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
  let mut units = Vec::new();
  for entry in std::fs::read_dir(dir)? {
    let path = entry?.path();
    if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("c") {
      units.push(path);
    }
  }
  units.sort();
  Ok(units)
}
