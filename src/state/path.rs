use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Attempts to locate an executable file in a colon-separated search path
/// Directories are tried in order and the first regular file with any execute bit wins
pub fn resolve_executable(name: &str, search_path: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    search_path
        .split(':')
        .filter(|dir| !dir.is_empty())
        .map(|dir| Path::new(dir).join(name))
        .find(|candidate| is_executable(candidate))
}

/// Checks if the file is executable (has the executable bit set)
pub fn is_executable(path: &Path) -> bool {
    match fs_err::metadata(path) {
        // 0o111 is the octal representation of the user/group/other executable bits
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// Expands the home directory shorthand at the start of a path string
/// Only a bare `~` or a `~/` prefix are expanded; `~user` is left alone
pub fn expand_home(path: &str, home_directory: &Path) -> PathBuf {
    if path == "~" {
        home_directory.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home_directory.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Gets the shortened version of a path for display, with the home directory collapsed to `~`
pub fn collapse_home(path: &Path, home_directory: Option<&Path>) -> String {
    let stripped = home_directory.and_then(|home| path.strip_prefix(home).ok());
    match stripped {
        Some(rest) if rest.as_os_str().is_empty() => String::from("~"),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}
