use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use cmd::{cmd_build, cmd_info, cmd_plan, cmd_stage};
use output::OutputFormat;

/// mcray-dist - Packages the mcray engine and its acceleration modules
#[derive(Parser)]
#[command(name = "mcray-dist")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the full pipeline: configure, compile, stage, write the receipt
  Build {
    /// Engine source root (default: current directory)
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Build workspace directory, created if absent
    #[arg(long, default_value = "build")]
    workspace: PathBuf,

    /// Package tree root the artifacts are staged into
    #[arg(long, default_value = ".")]
    package_root: PathBuf,

    /// Directory of accelerated source units to compile as modules
    #[arg(long)]
    accel: Option<PathBuf>,
  },

  /// Show the resolved feature matrix and the commands a build would run
  Plan {
    /// Engine source root (default: current directory)
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Build workspace directory the commands would target
    #[arg(long, default_value = "build")]
    workspace: PathBuf,
  },

  /// Stage artifacts from an already-built workspace
  Stage {
    /// Build workspace holding a completed compile
    workspace: PathBuf,

    /// Package tree root the artifacts are staged into
    #[arg(long, default_value = ".")]
    package_root: PathBuf,
  },

  /// Show the host platform facts the pipeline would use
  Info {
    /// Workspace to inspect for the library-directory convention
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },
}

fn main() -> Result<()> {
  // Initialize logging
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Build {
      source,
      workspace,
      package_root,
      accel,
    } => cmd_build(&source, &workspace, &package_root, accel.as_deref()),
    Commands::Plan { source, workspace } => cmd_plan(&source, &workspace),
    Commands::Stage { workspace, package_root } => cmd_stage(&workspace, &package_root),
    Commands::Info { workspace, format } => cmd_info(workspace.as_deref(), format),
  }
}
