//! Implementation of the `mcray-dist stage` command.
//!
//! Stages artifacts out of a workspace that was already built, then
//! writes the receipt. Useful when the native build ran separately and
//! only the package tree needs (re)assembling.

use std::path::Path;

use anyhow::{Context, Result};

use mcray_dist::matrix::FeatureMatrix;
use mcray_dist::receipt::{StagingReceipt, write_receipt};
use mcray_dist::stage::stage;

use crate::output::{print_error, print_stat, print_success};

pub fn cmd_stage(workspace: &Path, package_root: &Path) -> Result<()> {
  if !workspace.is_dir() {
    print_error(&format!("Workspace not found: {}", workspace.display()));
    std::process::exit(1);
  }

  // The matrix still comes from the environment so the receipt records
  // the toggle set the workspace was (presumably) configured with
  let matrix = FeatureMatrix::from_env();

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let staged = rt.block_on(stage(workspace, package_root)).context("Staging failed")?;

  let receipt = StagingReceipt::new(&matrix, None, &staged, package_root)
    .context("Failed to assemble staging receipt")?;
  let receipt_path = rt
    .block_on(write_receipt(package_root, &receipt))
    .context("Failed to write staging receipt")?;

  print_success("Artifacts staged");
  print_stat("Shared library", &staged.shared_lib.dest.display().to_string());
  print_stat("Executable", &staged.executable.dest.display().to_string());
  print_stat("Receipt", &receipt_path.display().to_string());

  Ok(())
}
