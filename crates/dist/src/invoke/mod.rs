//! Native build invocation.
//!
//! Drives the external build tool through its phases against one build
//! workspace: configure renders the feature matrix into cache options,
//! compile runs the tool's build mode with bounded parallelism, and
//! verify runs the engine's own test suite when the gate is on. Phases
//! are strictly sequential, one child process at a time, and any nonzero
//! exit is fatal for the whole packaging run.

pub(crate) mod process;

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::matrix::{BuildType, FeatureMatrix, env_toggle};
use crate::workspace::BuildWorkspace;

use process::run_tool;

/// Default bounded parallelism passed to the build tool.
pub const DEFAULT_COMPILE_JOBS: usize = 2;

/// Hard upper bound on compile parallelism.
pub const MAX_COMPILE_JOBS: usize = 8;

/// Errors from driving the external build tool.
#[derive(Debug, Error)]
pub enum InvokeError {
  /// The tool could not be spawned at all.
  #[error("failed to launch {program}: {source}")]
  ToolLaunch {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The configure phase exited nonzero.
  #[error("configure failed with exit code {code:?}")]
  ConfigureFailed { code: Option<i32> },

  /// The compile phase exited nonzero.
  #[error("compile failed with exit code {code:?}")]
  CompileFailed { code: Option<i32> },

  /// The engine's test suite exited nonzero.
  #[error("native test suite failed with exit code {code:?}")]
  VerifyFailed { code: Option<i32> },

  /// A phase was invoked out of order.
  #[error("cannot {operation} while build is {phase:?}")]
  OutOfOrder { operation: &'static str, phase: Phase },
}

/// Progress of a native build through its phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  NotConfigured,
  Configured,
  Built,
  Verified,
  Failed,
}

/// Tool selection and invocation settings, read once at startup.
#[derive(Debug, Clone)]
pub struct InvokeConfig {
  /// Build tool program.
  pub cmake: String,
  /// Test runner program.
  pub ctest: String,
  /// Compiler for acceleration modules.
  pub cc: String,
  /// Whether the verify phase runs at all.
  pub run_tests: bool,
  /// Requested compile parallelism, clamped when used.
  pub jobs: usize,
}

impl InvokeConfig {
  /// Read tool overrides and the test gate from the environment.
  pub fn from_env() -> Self {
    Self {
      cmake: env_tool("MCRAY_CMAKE", "cmake"),
      ctest: env_tool("MCRAY_CTEST", "ctest"),
      cc: env_tool("MCRAY_CC", "cc"),
      run_tests: env_toggle("MCRAY_RUN_TESTS"),
      jobs: DEFAULT_COMPILE_JOBS,
    }
  }
}

impl Default for InvokeConfig {
  fn default() -> Self {
    Self {
      cmake: "cmake".to_string(),
      ctest: "ctest".to_string(),
      cc: "cc".to_string(),
      run_tests: false,
      jobs: DEFAULT_COMPILE_JOBS,
    }
  }
}

/// Program override from the environment, skipping empty values.
fn env_tool(var: &str, default: &str) -> String {
  std::env::var(var)
    .ok()
    .filter(|v| !v.is_empty())
    .unwrap_or_else(|| default.to_string())
}

/// Arguments of the configure invocation.
///
/// Public so a dry run can print the exact command line without running it.
pub fn configure_args(source_root: &Path, workspace: &Path, matrix: &FeatureMatrix) -> Vec<String> {
  let mut args = vec![
    "-S".to_string(),
    source_root.display().to_string(),
    "-B".to_string(),
    workspace.display().to_string(),
  ];
  args.extend(matrix.configure_args());
  args
}

/// Arguments of the compile invocation, with parallelism clamped to
/// `1..=MAX_COMPILE_JOBS`.
pub fn compile_args(workspace: &Path, build_type: BuildType, jobs: usize) -> Vec<String> {
  vec![
    "--build".to_string(),
    workspace.display().to_string(),
    "--config".to_string(),
    build_type.to_string(),
    "--parallel".to_string(),
    jobs.clamp(1, MAX_COMPILE_JOBS).to_string(),
  ]
}

/// Arguments of the verify invocation.
pub fn verify_args(workspace: &Path) -> Vec<String> {
  vec![
    "--test-dir".to_string(),
    workspace.display().to_string(),
    "--output-on-failure".to_string(),
  ]
}

/// Drives one native build through configure, compile, and verify.
///
/// Each phase spawns one child process and waits for it. A nonzero exit
/// parks the build in [`Phase::Failed`]; calling a phase out of order is
/// an error without side effects.
pub struct NativeBuild {
  config: InvokeConfig,
  workspace: BuildWorkspace,
  phase: Phase,
}

impl NativeBuild {
  pub fn new(config: InvokeConfig, workspace: BuildWorkspace) -> Self {
    Self {
      config,
      workspace,
      phase: Phase::NotConfigured,
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn workspace(&self) -> &BuildWorkspace {
    &self.workspace
  }

  /// True once the build has passed every phase it was asked to run.
  pub fn is_complete(&self) -> bool {
    matches!(self.phase, Phase::Built | Phase::Verified)
  }

  /// Generate the native build system in the workspace.
  pub async fn configure(&mut self, source_root: &Path, matrix: &FeatureMatrix) -> Result<(), InvokeError> {
    self.expect_phase(Phase::NotConfigured, "configure")?;

    let args = configure_args(source_root, self.workspace.root(), matrix);
    info!(
      tool = %self.config.cmake,
      source = %source_root.display(),
      workspace = %self.workspace.root().display(),
      "configuring native build"
    );

    let status = self.run(&self.config.cmake, &args).await?;
    if !status.success() {
      self.phase = Phase::Failed;
      return Err(InvokeError::ConfigureFailed { code: status.code() });
    }

    self.phase = Phase::Configured;
    Ok(())
  }

  /// Compile the configured build.
  pub async fn compile(&mut self, build_type: BuildType) -> Result<(), InvokeError> {
    self.expect_phase(Phase::Configured, "compile")?;

    let args = compile_args(self.workspace.root(), build_type, self.config.jobs);
    info!(tool = %self.config.cmake, build_type = %build_type, "compiling native build");

    let status = self.run(&self.config.cmake, &args).await?;
    if !status.success() {
      self.phase = Phase::Failed;
      return Err(InvokeError::CompileFailed { code: status.code() });
    }

    self.phase = Phase::Built;
    Ok(())
  }

  /// Run the engine's own test suite against the built workspace.
  ///
  /// Callers skip this phase entirely when the test gate is off; it is
  /// never invoked as a no-op.
  pub async fn verify(&mut self) -> Result<(), InvokeError> {
    self.expect_phase(Phase::Built, "verify")?;

    let args = verify_args(self.workspace.root());
    info!(tool = %self.config.ctest, "running native test suite");

    let status = self.run(&self.config.ctest, &args).await?;
    if !status.success() {
      self.phase = Phase::Failed;
      return Err(InvokeError::VerifyFailed { code: status.code() });
    }

    self.phase = Phase::Verified;
    Ok(())
  }

  async fn run(&self, program: &str, args: &[String]) -> Result<std::process::ExitStatus, InvokeError> {
    run_tool(program, args).await.map_err(|source| InvokeError::ToolLaunch {
      program: program.to_string(),
      source,
    })
  }

  fn expect_phase(&self, want: Phase, operation: &'static str) -> Result<(), InvokeError> {
    if self.phase != want {
      return Err(InvokeError::OutOfOrder {
        operation,
        phase: self.phase,
      });
    }
    Ok(())
  }
}
