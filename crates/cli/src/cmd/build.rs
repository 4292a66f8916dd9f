//! Implementation of the `mcray-dist build` command.
//!
//! Runs the whole packaging pipeline: the native engine through
//! configure/compile/optional verify and staging, then one compile per
//! accelerated source unit. Any failure aborts the run.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use mcray_dist::invoke::InvokeConfig;
use mcray_dist::matrix::FeatureMatrix;
use mcray_dist::registry::{build_all, enumerate_targets};

use crate::output::{format_duration, print_stat, print_success};

/// Execute the build command.
///
/// The feature matrix and tool configuration are read from the
/// environment exactly once, here; everything downstream receives them
/// by value. Prints a summary of the staged artifacts on success.
pub fn cmd_build(source: &Path, workspace: &Path, package_root: &Path, accel: Option<&Path>) -> Result<()> {
  let matrix = FeatureMatrix::from_env();
  let config = InvokeConfig::from_env();

  let targets = enumerate_targets(source, accel).context("Failed to enumerate build targets")?;

  let started = Instant::now();

  // Run async packaging loop
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(build_all(&targets, &matrix, &config, workspace, package_root))
    .context("Packaging failed")?;

  println!();
  print_success(&format!("Packaging complete in {}", format_duration(started.elapsed())));
  if let Some(staged) = &report.staged {
    print_stat("Shared library", &staged.shared_lib.dest.display().to_string());
    print_stat("Executable", &staged.executable.dest.display().to_string());
  }
  if let Some(receipt) = &report.receipt {
    print_stat("Receipt", &receipt.display().to_string());
  }
  if !report.modules.is_empty() {
    print_stat("Acceleration modules", &report.modules.len().to_string());
  }

  Ok(())
}
