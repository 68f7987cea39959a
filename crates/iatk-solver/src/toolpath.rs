//! Locating external solver binaries on the PATH.

use std::env;
use std::path::{Path, PathBuf};

/// Find a tool on the PATH, `which`/`where` style. A name containing a path
/// separator is checked directly instead.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return existing_executable(candidate.to_path_buf());
    }

    let path = env::var_os("PATH")?;
    for dir in env::split_paths(&path) {
        if let Some(found) = existing_executable(dir.join(name)) {
            return Some(found);
        }
    }
    None
}

fn existing_executable(path: PathBuf) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path);
    }
    if cfg!(windows) {
        for ext in ["exe", "bat", "cmd"] {
            let with_ext = path.with_extension(ext);
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
    }
    None
}

/// Names from `tools` that cannot be found, in input order.
pub fn missing_tools<'a>(tools: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    tools
        .into_iter()
        .filter(|name| find_in_path(name).is_none())
        .map(str::to_string)
        .collect()
}
