use std::path::{Path, PathBuf};

/// Library output directory name on lib64-convention hosts
pub const LIB64: &str = "lib64";
/// Library output directory name everywhere else
pub const LIB: &str = "lib";

/// Picks the library output directory the native build tool used.
///
/// The build tool places compiled libraries under `lib64` on some Linux
/// distributions and under `lib` everywhere else, and nothing in its
/// output announces which convention applied. The only reliable signal
/// is which directory exists, so existence is the check: `lib64` wins
/// when present as a directory, otherwise the answer is `lib` even if
/// `lib` does not exist either. Whether the library file itself exists
/// inside is the stager's concern, not this function's.
pub fn library_dir(workspace: &Path) -> PathBuf {
  let lib64 = workspace.join(LIB64);
  if lib64.is_dir() {
    lib64
  } else {
    workspace.join(LIB)
  }
}

/// Name-only variant of [`library_dir`], for diagnostics
pub fn library_dir_name(workspace: &Path) -> &'static str {
  if workspace.join(LIB64).is_dir() { LIB64 } else { LIB }
}
