//! Implementation of the `mcray-dist info` command.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use mcray_platform::libdir::library_dir_name;
use mcray_platform::os::host_shared_lib_suffix;
use mcray_platform::platform_triple;

use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Serialize)]
struct HostInfo {
  #[serde(skip_serializing_if = "Option::is_none")]
  platform: Option<String>,
  shared_lib_suffix: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  library_dir: Option<&'static str>,
}

pub fn cmd_info(workspace: Option<&Path>, format: OutputFormat) -> Result<()> {
  let info = HostInfo {
    platform: platform_triple(),
    shared_lib_suffix: host_shared_lib_suffix(),
    library_dir: workspace.map(library_dir_name),
  };

  if format.is_json() {
    return print_json(&info);
  }

  println!("Host:");
  print_stat("Platform", info.platform.as_deref().unwrap_or("unknown"));
  print_stat("Shared library suffix", info.shared_lib_suffix);
  if let Some(dir) = info.library_dir {
    print_stat("Library directory", dir);
  }

  Ok(())
}
