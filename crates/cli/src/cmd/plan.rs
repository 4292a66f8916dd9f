//! Implementation of the `mcray-dist plan` command.
//!
//! Resolves the feature matrix and tool configuration from the
//! environment and prints the exact commands a build would run, without
//! executing anything.

use std::path::Path;

use anyhow::Result;

use mcray_dist::invoke::{self, InvokeConfig};
use mcray_dist::matrix::{Feature, FeatureMatrix};

pub fn cmd_plan(source: &Path, workspace: &Path) -> Result<()> {
  let matrix = FeatureMatrix::from_env();
  let config = InvokeConfig::from_env();

  println!("Build type: {}", matrix.build_type);
  println!("Features:");
  for feature in Feature::ALL {
    let state = if matrix.is_enabled(feature) { "on" } else { "off" };
    println!("  {}: {}", feature, state);
  }
  if let Some(extra) = &matrix.extra_args {
    println!("Extra configure args: {}", extra);
  }

  println!();
  println!(
    "Configure: {} {}",
    config.cmake,
    invoke::configure_args(source, workspace, &matrix).join(" ")
  );
  println!(
    "Compile:   {} {}",
    config.cmake,
    invoke::compile_args(workspace, matrix.build_type, config.jobs).join(" ")
  );
  if config.run_tests {
    println!("Verify:    {} {}", config.ctest, invoke::verify_args(workspace).join(" "));
  } else {
    println!("Verify:    skipped (MCRAY_RUN_TESTS is not \"on\")");
  }

  Ok(())
}
