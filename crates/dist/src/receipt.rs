//! Staging receipt written into the package tree.
//!
//! After every artifact has landed, one JSON file records what was
//! staged: format version, engine version (when discovered), build type,
//! enabled features, host platform, and a digest per artifact. Content is
//! deterministic, so re-staging an unchanged workspace rewrites the same
//! bytes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::consts::ENGINE_NAME;
use crate::matrix::FeatureMatrix;
use crate::stage::StagedArtifacts;
use crate::util::hash::sha256_file;

/// Receipt file name inside the package directory.
pub const STAGING_RECEIPT: &str = ".mcray-dist.json";

/// Receipt format version.
const RECEIPT_VERSION: u32 = 1;

/// Errors from assembling or persisting the receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
  #[error("receipt serialization failed: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Record of one completed staging run.
#[derive(Debug, Serialize, Deserialize)]
pub struct StagingReceipt {
  /// Receipt format version.
  pub version: u32,
  /// Engine version parsed from the project file, when discovery succeeded.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub engine_version: Option<String>,
  /// Build type the engine was compiled as.
  pub build_type: String,
  /// Enabled feature names, canonical order.
  pub features: Vec<String>,
  /// Host platform triple, when detection succeeded.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub platform: Option<String>,
  /// SHA-256 per staged artifact, keyed by package-relative path.
  pub artifacts: BTreeMap<String, String>,
}

impl StagingReceipt {
  /// Assemble the receipt for a completed stage.
  pub fn new(
    matrix: &FeatureMatrix,
    engine_version: Option<String>,
    staged: &StagedArtifacts,
    package_root: &Path,
  ) -> Result<Self, ReceiptError> {
    let mut artifacts = BTreeMap::new();
    for artifact in staged.all() {
      let digest = sha256_file(&artifact.dest)?;
      artifacts.insert(package_relative_key(&artifact.dest, package_root), digest);
    }

    Ok(Self {
      version: RECEIPT_VERSION,
      engine_version,
      build_type: matrix.build_type.to_string(),
      features: matrix.enabled_features().iter().map(|f| f.name().to_string()).collect(),
      platform: mcray_platform::platform_triple(),
      artifacts,
    })
  }
}

/// Artifact key: package-relative path with forward slashes on every host.
fn package_relative_key(dest: &Path, package_root: &Path) -> String {
  let relative = dest.strip_prefix(package_root).unwrap_or(dest);
  relative.to_string_lossy().replace('\\', "/")
}

/// Where the receipt lives under the package root.
pub fn receipt_path(package_root: &Path) -> PathBuf {
  package_root.join(ENGINE_NAME).join(STAGING_RECEIPT)
}

/// Write the receipt. Called only after every artifact landed.
pub async fn write_receipt(package_root: &Path, receipt: &StagingReceipt) -> Result<PathBuf, ReceiptError> {
  let path = receipt_path(package_root);
  let content = serde_json::to_string_pretty(receipt)?;
  fs::write(&path, format!("{content}\n")).await?;

  debug!(path = %path.display(), "staging receipt written");
  Ok(path)
}

/// Read a previously written receipt.
///
/// Returns `None` when no receipt exists.
pub fn read_receipt(package_root: &Path) -> Result<Option<StagingReceipt>, ReceiptError> {
  let path = receipt_path(package_root);
  if !path.exists() {
    return Ok(None);
  }

  let content = std::fs::read_to_string(&path)?;
  Ok(Some(serde_json::from_str(&content)?))
}
