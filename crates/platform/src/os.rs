use std::fmt;

/// Filename suffix of shared libraries on macOS
pub const SUFFIX_DYLIB: &str = "dylib";
/// Filename suffix of shared libraries everywhere else
pub const SUFFIX_SO: &str = "so";

/// Operating system variants the packaging pipeline understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "macos",
      Self::Windows => "windows",
    }
  }

  /// Returns the shared-library filename suffix for this OS
  pub fn shared_lib_suffix(&self) -> &'static str {
    shared_lib_suffix(self.as_str())
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Returns the current operating system
///
/// Returns `None` if the OS is not supported
pub fn os() -> Option<Os> {
  Os::current()
}

/// Maps an OS identifier to the shared-library filename suffix.
///
/// Exactly two outcomes exist: macOS names its dynamic libraries
/// `*.dylib`, every other platform we ship for names them `*.so`.
/// Unrecognized identifiers take the common branch, so this is total
/// and never fails.
pub fn shared_lib_suffix(os: &str) -> &'static str {
  match os {
    "macos" => SUFFIX_DYLIB,
    _ => SUFFIX_SO,
  }
}

/// Returns the shared-library suffix for the machine we are running on
pub fn host_shared_lib_suffix() -> &'static str {
  shared_lib_suffix(std::env::consts::OS)
}
