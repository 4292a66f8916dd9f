//! Workspace-wide constants.

/// Canonical name of the engine being packaged.
///
/// Names the package directory, the shared library (`libmcray.<suffix>`),
/// and the staged executable.
pub const ENGINE_NAME: &str = "mcray";

/// The only value that enables a boolean environment toggle.
///
/// Comparison is a case-sensitive exact match; any other value, including
/// `"ON"`, `"1"`, or `"true"`, leaves the toggle disabled.
pub const TRUE_SENTINEL: &str = "on";
