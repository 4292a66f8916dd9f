//! Feature matrix: the declarative build configuration.
//!
//! Every optional capability of the engine is a boolean toggle read once
//! from the process environment. The variable name doubles as the cache
//! option passed to the build tool, so the matrix renders directly into
//! configure arguments. Nothing here validates toggle combinations; a
//! conflicting set is the build tool's to reject at configure time.

use std::fmt;

use crate::consts::TRUE_SENTINEL;

/// Optional engine capabilities toggled at configure time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
  /// Shared-memory parallel execution.
  OpenMp,
  /// Distributed execution.
  Mpi,
  /// Parallel output preference for distributed runs.
  ParallelIo,
  /// CAD mesh-geometry backend.
  CadMesh,
  /// Auxiliary finite-element mesh backend.
  FeMesh,
  /// Alternate material-database backend.
  CrystalDb,
  /// Alternate transport-coupling backend.
  Coupling,
  /// Coverage instrumentation of the engine build.
  Coverage,
}

impl Feature {
  /// All features, in the order they render to configure arguments.
  pub const ALL: [Feature; 8] = [
    Feature::OpenMp,
    Feature::Mpi,
    Feature::ParallelIo,
    Feature::CadMesh,
    Feature::FeMesh,
    Feature::CrystalDb,
    Feature::Coupling,
    Feature::Coverage,
  ];

  /// Environment variable name, which doubles as the cache option name.
  pub fn option_name(&self) -> &'static str {
    match self {
      Self::OpenMp => "MCRAY_USE_OPENMP",
      Self::Mpi => "MCRAY_USE_MPI",
      Self::ParallelIo => "MCRAY_PREFER_PARALLEL_IO",
      Self::CadMesh => "MCRAY_USE_CADMESH",
      Self::FeMesh => "MCRAY_USE_FEMESH",
      Self::CrystalDb => "MCRAY_USE_CRYSTALDB",
      Self::Coupling => "MCRAY_USE_COUPLING",
      Self::Coverage => "MCRAY_ENABLE_COVERAGE",
    }
  }

  /// Short lowercase identifier used in receipts and summaries.
  pub fn name(&self) -> &'static str {
    match self {
      Self::OpenMp => "openmp",
      Self::Mpi => "mpi",
      Self::ParallelIo => "parallel-io",
      Self::CadMesh => "cadmesh",
      Self::FeMesh => "femesh",
      Self::CrystalDb => "crystaldb",
      Self::Coupling => "coupling",
      Self::Coverage => "coverage",
    }
  }
}

impl fmt::Display for Feature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// Build type forwarded to the build tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BuildType {
  #[default]
  Release,
  Debug,
  RelWithDebInfo,
  MinSizeRel,
}

impl BuildType {
  /// Returns the identifier the build tool expects.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Release => "Release",
      Self::Debug => "Debug",
      Self::RelWithDebInfo => "RelWithDebInfo",
      Self::MinSizeRel => "MinSizeRel",
    }
  }

  /// Parse a build-type name, falling back to the default.
  ///
  /// A malformed value is never an error; the packaging run proceeds with
  /// the default type.
  pub fn parse_lenient(value: &str) -> Self {
    match value {
      "Release" => Self::Release,
      "Debug" => Self::Debug,
      "RelWithDebInfo" => Self::RelWithDebInfo,
      "MinSizeRel" => Self::MinSizeRel,
      _ => Self::default(),
    }
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Immutable snapshot of the build configuration for one packaging run.
///
/// Constructed once from the environment; no component reads the
/// environment again after construction.
#[derive(Debug, Clone, Default)]
pub struct FeatureMatrix {
  enabled: Vec<Feature>,
  pub build_type: BuildType,
  /// Opaque extra configure argument, appended verbatim.
  pub extra_args: Option<String>,
}

impl FeatureMatrix {
  /// Read the matrix from the process environment.
  ///
  /// One variable per feature, compared against the exact sentinel;
  /// absence or any other value leaves the feature disabled.
  pub fn from_env() -> Self {
    let enabled = Feature::ALL
      .iter()
      .copied()
      .filter(|f| env_toggle(f.option_name()))
      .collect();

    let build_type = match std::env::var("MCRAY_BUILD_TYPE") {
      Ok(value) => BuildType::parse_lenient(&value),
      Err(_) => BuildType::default(),
    };

    let extra_args = std::env::var("MCRAY_CMAKE_ARGS").ok().filter(|v| !v.is_empty());

    Self {
      enabled,
      build_type,
      extra_args,
    }
  }

  /// Matrix with the given features enabled, for callers that bypass the
  /// environment.
  pub fn with_features(features: &[Feature], build_type: BuildType) -> Self {
    // Canonical order regardless of input order
    let enabled = Feature::ALL.iter().copied().filter(|f| features.contains(f)).collect();
    Self {
      enabled,
      build_type,
      extra_args: None,
    }
  }

  /// Whether a feature is enabled.
  pub fn is_enabled(&self, feature: Feature) -> bool {
    self.enabled.contains(&feature)
  }

  /// Enabled features in canonical order.
  pub fn enabled_features(&self) -> &[Feature] {
    &self.enabled
  }

  /// Render the deterministic configure override list: the build type,
  /// then every feature as `ON`/`OFF` in canonical order, then the extra
  /// argument verbatim if present.
  pub fn configure_args(&self) -> Vec<String> {
    let mut args = vec![format!("-DCMAKE_BUILD_TYPE={}", self.build_type)];

    for feature in Feature::ALL {
      let state = if self.is_enabled(feature) { "ON" } else { "OFF" };
      args.push(format!("-D{}={}", feature.option_name(), state));
    }

    if let Some(extra) = &self.extra_args {
      args.push(extra.clone());
    }

    args
  }
}

/// True iff the variable is set to exactly the sentinel value.
pub(crate) fn env_toggle(name: &str) -> bool {
  std::env::var(name).is_ok_and(|v| v == TRUE_SENTINEL)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use temp_env::with_vars;

  /// Unsets every variable the matrix reads, so ambient environment can't
  /// leak into assertions.
  fn with_clean_env<F: FnOnce()>(overrides: &[(&str, &str)], f: F) {
    let mut vars: Vec<(&str, Option<&str>)> = Feature::ALL
      .iter()
      .map(|feature| (feature.option_name(), None))
      .collect();
    vars.push(("MCRAY_BUILD_TYPE", None));
    vars.push(("MCRAY_CMAKE_ARGS", None));

    for (name, value) in overrides {
      if let Some(slot) = vars.iter_mut().find(|(n, _)| n == name) {
        slot.1 = Some(value);
      } else {
        vars.push((name, Some(value)));
      }
    }

    with_vars(vars, f);
  }

  #[test]
  #[serial]
  fn empty_environment_disables_everything() {
    with_clean_env(&[], || {
      let matrix = FeatureMatrix::from_env();
      assert!(matrix.enabled_features().is_empty());
      assert_eq!(matrix.build_type, BuildType::Release);
      assert!(matrix.extra_args.is_none());
    });
  }

  #[test]
  #[serial]
  fn sentinel_is_exact_match() {
    with_clean_env(
      &[
        ("MCRAY_USE_OPENMP", "on"),
        ("MCRAY_USE_MPI", "ON"),
        ("MCRAY_USE_CADMESH", "1"),
        ("MCRAY_USE_FEMESH", "true"),
      ],
      || {
        let matrix = FeatureMatrix::from_env();
        assert!(matrix.is_enabled(Feature::OpenMp));
        assert!(!matrix.is_enabled(Feature::Mpi));
        assert!(!matrix.is_enabled(Feature::CadMesh));
        assert!(!matrix.is_enabled(Feature::FeMesh));
      },
    );
  }

  #[test]
  #[serial]
  fn build_type_parses_with_fallback() {
    with_clean_env(&[("MCRAY_BUILD_TYPE", "Debug")], || {
      assert_eq!(FeatureMatrix::from_env().build_type, BuildType::Debug);
    });

    with_clean_env(&[("MCRAY_BUILD_TYPE", "fastest")], || {
      assert_eq!(FeatureMatrix::from_env().build_type, BuildType::Release);
    });
  }

  #[test]
  #[serial]
  fn extra_args_pass_through_verbatim() {
    with_clean_env(&[("MCRAY_CMAKE_ARGS", "")], || {
      // An empty value contributes nothing
      assert!(FeatureMatrix::from_env().extra_args.is_none());
    });

    with_clean_env(&[("MCRAY_CMAKE_ARGS", "-DHDF5_ROOT=/opt/hdf5")], || {
      let matrix = FeatureMatrix::from_env();
      assert_eq!(matrix.extra_args.as_deref(), Some("-DHDF5_ROOT=/opt/hdf5"));
      assert_eq!(matrix.configure_args().last().map(String::as_str), Some("-DHDF5_ROOT=/opt/hdf5"));
    });
  }

  #[test]
  #[serial]
  fn single_toggle_renders_on_and_rest_off() {
    with_clean_env(&[("MCRAY_USE_MPI", "on")], || {
      let args = FeatureMatrix::from_env().configure_args();

      assert_eq!(args[0], "-DCMAKE_BUILD_TYPE=Release");
      assert!(args.contains(&"-DMCRAY_USE_MPI=ON".to_string()));
      for feature in Feature::ALL {
        if feature != Feature::Mpi {
          assert!(args.contains(&format!("-D{}=OFF", feature.option_name())));
        }
      }
    });
  }

  #[test]
  fn configure_args_order_is_deterministic() {
    let matrix = FeatureMatrix::with_features(&[Feature::Coverage, Feature::OpenMp], BuildType::Debug);
    let args = matrix.configure_args();

    assert_eq!(args[0], "-DCMAKE_BUILD_TYPE=Debug");
    assert_eq!(args[1], "-DMCRAY_USE_OPENMP=ON");
    assert_eq!(args[8], "-DMCRAY_ENABLE_COVERAGE=ON");
    assert_eq!(args.len(), 1 + Feature::ALL.len());
    assert_eq!(args, matrix.configure_args());
  }

  #[test]
  fn with_features_normalizes_order() {
    let matrix = FeatureMatrix::with_features(&[Feature::Coverage, Feature::OpenMp], BuildType::Release);
    assert_eq!(matrix.enabled_features(), &[Feature::OpenMp, Feature::Coverage]);
  }

  #[test]
  fn build_type_names_round_trip() {
    for build_type in [
      BuildType::Release,
      BuildType::Debug,
      BuildType::RelWithDebInfo,
      BuildType::MinSizeRel,
    ] {
      assert_eq!(BuildType::parse_lenient(build_type.as_str()), build_type);
    }
  }
}
