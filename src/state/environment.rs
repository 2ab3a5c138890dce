use std::env;
use std::path::PathBuf;

use strum::{AsRefStr, Display};

/// Identifier enum for the environment variables the shell reads
/// * The shell never writes environment variables, it only consults them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum EnvVar {
    Home,
    Path,
}

impl EnvVar {
    /// Reads the variable from the process environment
    /// An empty value is treated the same as an unset one
    pub fn get(self) -> Option<String> {
        env::var(self.as_ref()).ok().filter(|value| !value.is_empty())
    }
}

/// Convenience getter for the home directory as reported by `HOME`
pub fn home_directory() -> Option<PathBuf> {
    EnvVar::Home.get().map(PathBuf::from)
}
