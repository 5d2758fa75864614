//! Executable lookup for the external tools actions spawn.
//!
//! Actions shell out to platform helpers (`open`, `xdg-open`, clipboard
//! tools). Lookup goes through PATH once per call so a missing tool becomes a
//! descriptive action failure instead of a spawn error.

use std::env;
use std::path::{Path, PathBuf};

/// Regular file with an execute bit (any file off unix).
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Find an executable by name somewhere on PATH.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// First of `names` present on PATH, in preference order.
pub fn first_on_path<'a>(names: &[&'a str]) -> Option<(&'a str, PathBuf)> {
    names
        .iter()
        .find_map(|name| find_on_path(name).map(|path| (*name, path)))
}
