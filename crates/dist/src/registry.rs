//! Build-target registry and the packaging loop.
//!
//! One packaging run works through an ordered list of targets: the
//! native engine, then one target per accelerated source unit. The
//! native target runs the full configure/compile/verify/stage pipeline;
//! module targets run a plain source-to-module compile. Packaging is
//! all-or-nothing: the first fatal failure aborts every remaining
//! target.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::accel::{self, AccelError};
use crate::invoke::{InvokeConfig, InvokeError, NativeBuild};
use crate::matrix::FeatureMatrix;
use crate::receipt::{self, ReceiptError, StagingReceipt};
use crate::stage::{self, StageError, StagedArtifacts};
use crate::version::discover_version;
use crate::workspace::BuildWorkspace;

/// Errors that abort a packaging run.
#[derive(Debug, Error)]
pub enum PackageError {
  /// The build workspace could not be created.
  #[error("workspace preparation failed: {0}")]
  Workspace(#[source] std::io::Error),

  #[error(transparent)]
  Invoke(#[from] InvokeError),

  #[error(transparent)]
  Stage(#[from] StageError),

  #[error(transparent)]
  Accel(#[from] AccelError),

  #[error(transparent)]
  Receipt(#[from] ReceiptError),
}

/// One unit of packaging work. Each target owns a read-only reference to
/// its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildTarget {
  /// The engine itself, built out-of-tree in the workspace.
  NativeEngine { source_root: PathBuf },
  /// One accelerated source unit, compiled in place.
  AccelModule { source: PathBuf },
}

impl BuildTarget {
  /// Short description for logs and summaries.
  pub fn describe(&self) -> String {
    match self {
      Self::NativeEngine { source_root } => format!("native engine ({})", source_root.display()),
      Self::AccelModule { source } => format!("module {}", source.display()),
    }
  }
}

/// What a completed packaging run produced.
#[derive(Debug, Default)]
pub struct BuildReport {
  /// Artifacts staged by the native-engine target, when one ran.
  pub staged: Option<StagedArtifacts>,
  /// Receipt path, written after the native artifacts landed.
  pub receipt: Option<PathBuf>,
  /// Compiled acceleration modules, in target order.
  pub modules: Vec<PathBuf>,
}

/// The standard target list: the native engine first, then one module
/// target per accelerated unit found under `accel_dir`.
pub fn enumerate_targets(source_root: &Path, accel_dir: Option<&Path>) -> std::io::Result<Vec<BuildTarget>> {
  let mut targets = vec![BuildTarget::NativeEngine {
    source_root: source_root.to_path_buf(),
  }];

  if let Some(dir) = accel_dir {
    for source in accel::discover_units(dir)? {
      targets.push(BuildTarget::AccelModule { source });
    }
  }

  Ok(targets)
}

/// Run every target in order against one workspace and package tree.
///
/// The matrix and tool configuration are resolved by the caller before
/// this loop starts; nothing here reads the environment. The first
/// error propagates immediately and no later target is attempted.
pub async fn build_all(
  targets: &[BuildTarget],
  matrix: &FeatureMatrix,
  config: &InvokeConfig,
  workspace_root: &Path,
  package_root: &Path,
) -> Result<BuildReport, PackageError> {
  let mut report = BuildReport::default();

  for target in targets {
    info!(target = %target.describe(), "building target");

    match target {
      BuildTarget::NativeEngine { source_root } => {
        let workspace = BuildWorkspace::prepare(workspace_root)
          .await
          .map_err(PackageError::Workspace)?;

        let mut build = NativeBuild::new(config.clone(), workspace);
        build.configure(source_root, matrix).await?;
        build.compile(matrix.build_type).await?;
        if config.run_tests {
          build.verify().await?;
        }

        let staged = stage::stage(build.workspace().root(), package_root).await?;

        let engine_version = discover_version(source_root);
        let staging_receipt = StagingReceipt::new(matrix, engine_version, &staged, package_root)?;
        let receipt_path = receipt::write_receipt(package_root, &staging_receipt).await?;

        report.staged = Some(staged);
        report.receipt = Some(receipt_path);
      }

      BuildTarget::AccelModule { source } => {
        let module = accel::compile_unit(&config.cc, source).await?;
        report.modules.push(module);
      }
    }
  }

  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enumerate_puts_the_engine_first() {
    let dir = tempfile::tempdir().unwrap();
    let accel = dir.path().join("accel");
    std::fs::create_dir(&accel).unwrap();
    std::fs::write(accel.join("zernike.c"), b"").unwrap();
    std::fs::write(accel.join("legendre.c"), b"").unwrap();

    let targets = enumerate_targets(Path::new("/src"), Some(&accel)).unwrap();

    assert_eq!(targets.len(), 3);
    assert!(matches!(targets[0], BuildTarget::NativeEngine { .. }));
    assert_eq!(
      targets[1],
      BuildTarget::AccelModule {
        source: accel.join("legendre.c")
      }
    );
    assert_eq!(
      targets[2],
      BuildTarget::AccelModule {
        source: accel.join("zernike.c")
      }
    );
  }

  #[test]
  fn enumerate_without_modules_is_engine_only() {
    let targets = enumerate_targets(Path::new("/src"), None).unwrap();
    assert_eq!(targets.len(), 1);
  }

  #[cfg(unix)]
  mod pipeline {
    use super::*;
    use crate::matrix::{BuildType, Feature};
    use crate::stage::shared_lib_name;
    use crate::util::testutil::{read_tool_log, stub_tool, stub_tool_script};
    use mcray_platform::os::host_shared_lib_suffix;
    use tempfile::TempDir;

    struct Fixture {
      dir: TempDir,
      config: InvokeConfig,
      source_root: PathBuf,
      workspace: PathBuf,
      package_root: PathBuf,
      tools: PathBuf,
    }

    /// Stub tools plus an engine source root. The cmake stub fabricates
    /// the workspace outputs a real compile would leave behind.
    fn fixture() -> Fixture {
      let dir = TempDir::new().unwrap();
      let tools = dir.path().join("tools");
      let workspace = dir.path().join("ws");
      let package_root = dir.path().join("pkg");
      let source_root = dir.path().join("src");
      std::fs::create_dir_all(&tools).unwrap();
      std::fs::create_dir_all(&package_root).unwrap();
      std::fs::create_dir_all(&source_root).unwrap();
      std::fs::write(
        source_root.join("CMakeLists.txt"),
        "project(mcray VERSION 1.4.2 LANGUAGES CXX C)\n",
      )
      .unwrap();

      let lib_name = shared_lib_name(host_shared_lib_suffix());
      let cmake_body = format!(
        "echo \"$@\" >> \"{log}\"\n\
         mkdir -p \"{ws}/lib\" \"{ws}/bin\"\n\
         printf 'library bytes' > \"{ws}/lib/{lib_name}\"\n\
         printf 'engine bytes' > \"{ws}/bin/mcray\"\n\
         exit 0\n",
        log = tools.join("cmake.log").display(),
        ws = workspace.display(),
      );
      let cmake = stub_tool_script(&tools, "cmake", &cmake_body);
      let ctest = stub_tool(&tools, "ctest", 0);
      let cc = stub_tool(&tools, "cc", 0);

      let config = InvokeConfig {
        cmake: cmake.display().to_string(),
        ctest: ctest.display().to_string(),
        cc: cc.display().to_string(),
        run_tests: false,
        ..InvokeConfig::default()
      };

      Fixture {
        dir,
        config,
        source_root,
        workspace,
        package_root,
        tools,
      }
    }

    #[tokio::test]
    async fn full_run_stages_and_writes_the_receipt() {
      let fx = fixture();
      let accel = fx.dir.path().join("accel");
      std::fs::create_dir(&accel).unwrap();
      std::fs::write(accel.join("legendre.c"), b"").unwrap();

      let targets = enumerate_targets(&fx.source_root, Some(&accel)).unwrap();
      let matrix = FeatureMatrix::with_features(&[Feature::OpenMp], BuildType::Release);

      let report = build_all(&targets, &matrix, &fx.config, &fx.workspace, &fx.package_root)
        .await
        .unwrap();

      let staged = report.staged.unwrap();
      assert!(staged.shared_lib.dest.exists());
      assert!(staged.executable.dest.exists());
      assert_eq!(report.modules, vec![accel.join("legendre").with_extension(host_shared_lib_suffix())]);

      let written = receipt::read_receipt(&fx.package_root).unwrap().unwrap();
      assert_eq!(written.engine_version.as_deref(), Some("1.4.2"));
      assert_eq!(written.features, vec!["openmp".to_string()]);

      // Test gate off: the verify phase never ran (not a silent no-op)
      assert!(read_tool_log(&fx.tools, "ctest").is_empty());
    }

    #[tokio::test]
    async fn test_gate_runs_the_native_suite() {
      let fx = fixture();
      let config = InvokeConfig {
        run_tests: true,
        ..fx.config.clone()
      };
      let targets = enumerate_targets(&fx.source_root, None).unwrap();

      build_all(&targets, &FeatureMatrix::default(), &config, &fx.workspace, &fx.package_root)
        .await
        .unwrap();

      assert!(read_tool_log(&fx.tools, "ctest").contains("--test-dir"));
    }

    #[tokio::test]
    async fn verify_failure_aborts_before_staging() {
      let fx = fixture();
      let ctest = stub_tool(&fx.tools, "ctest-failing", 1);
      let config = InvokeConfig {
        ctest: ctest.display().to_string(),
        run_tests: true,
        ..fx.config.clone()
      };
      let targets = enumerate_targets(&fx.source_root, None).unwrap();

      let err = build_all(&targets, &FeatureMatrix::default(), &config, &fx.workspace, &fx.package_root)
        .await
        .unwrap_err();

      assert!(matches!(err, PackageError::Invoke(InvokeError::VerifyFailed { .. })));
      assert!(!fx.package_root.join("mcray").exists());
    }

    #[tokio::test]
    async fn first_failure_aborts_remaining_targets() {
      let fx = fixture();
      let cc = stub_tool(&fx.tools, "cc-failing", 1);
      let config = InvokeConfig {
        cc: cc.display().to_string(),
        ..fx.config.clone()
      };

      let unit = fx.dir.path().join("legendre.c");
      std::fs::write(&unit, b"").unwrap();

      // A module target ahead of the engine: its failure must stop the loop
      let targets = vec![
        BuildTarget::AccelModule { source: unit },
        BuildTarget::NativeEngine {
          source_root: fx.source_root.clone(),
        },
      ];

      let err = build_all(&targets, &FeatureMatrix::default(), &config, &fx.workspace, &fx.package_root)
        .await
        .unwrap_err();

      assert!(matches!(err, PackageError::Accel(AccelError::CompileFailed { .. })));
      assert!(read_tool_log(&fx.tools, "cmake").is_empty());
    }

    #[tokio::test]
    async fn missing_library_surfaces_as_stage_error() {
      let fx = fixture();
      // A cmake stub that exits cleanly but produces nothing
      let cmake = stub_tool(&fx.tools, "cmake-empty", 0);
      let config = InvokeConfig {
        cmake: cmake.display().to_string(),
        ..fx.config.clone()
      };
      let targets = enumerate_targets(&fx.source_root, None).unwrap();

      let err = build_all(&targets, &FeatureMatrix::default(), &config, &fx.workspace, &fx.package_root)
        .await
        .unwrap_err();

      assert!(matches!(err, PackageError::Stage(StageError::MissingArtifact { .. })));
    }
  }
}
