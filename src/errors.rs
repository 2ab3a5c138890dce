use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::state::EnvVar;

pub trait Handle<T, E> {
    /// Replaces any error kind with a new one, discarding the original.
    /// Useful in situations where the original error provides no additional clarity.
    fn replace_err(self, new_error: impl FnOnce() -> E) -> Result<T, E>;
}

impl<T, E, F> Handle<T, E> for std::result::Result<T, F> {
    fn replace_err(self, new_error: impl FnOnce() -> E) -> Result<T, E> {
        self.map_err(|_| new_error())
    }
}

impl<T, E> Handle<T, E> for Option<T> {
    fn replace_err(self, new_error: impl FnOnce() -> E) -> Result<T, E> {
        self.ok_or_else(new_error)
    }
}

/// Error type for errors which occur during execution of builtins.
/// Every variant is reported on the builtin's stderr and turns into exit status 1.
#[derive(Error, Debug)]
pub enum BuiltinError {
    /// Rendered clap output, printed as-is
    #[error("{0}")]
    Usage(String),
    #[error("{0} not set")]
    MissingEnvironmentVariable(EnvVar),
    #[error("{}: No such file or directory", .0.display())]
    UnknownDirectory(PathBuf),
    #[error("{}: Not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("{}: {source}", path.display())]
    ChangeDirectoryFailed { path: PathBuf, source: io::Error },
    #[error("{0}")]
    CurrentDirectoryUnavailable(#[source] io::Error),
    #[error("{0}")]
    TerminalOperationFailed(#[source] io::Error),
    #[error("write error: {0}")]
    Output(#[from] io::Error),
}

impl BuiltinError {
    /// Writes the error the way the shell reports it: `<builtin>: <message>`.
    /// Usage errors are already formatted by clap and are written verbatim.
    pub fn report(&self, builtin: &str, stderr: &mut dyn io::Write) {
        // A failure to report is not itself reportable
        let _ = match self {
            BuiltinError::Usage(text) => write!(stderr, "{}", text),
            other => writeln!(stderr, "{}: {}", builtin, other),
        };
    }
}

/// Error type for errors which occur while wiring up or spawning external processes.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("{0}: command not found")]
    CommandNotFound(String),
    #[error("{name}: {source}")]
    FailedToSpawn { name: String, source: io::Error },
    #[error("{}: {source}", path.display())]
    FailedToOpenRedirect { path: PathBuf, source: io::Error },
    #[error("failed to create pipe: {0}")]
    FailedToCreatePipe(#[source] io::Error),
    #[error("failed to redirect {stream}: {source}")]
    FailedToSwapDescriptor {
        stream: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to wait for {name}: {source}")]
    FailedToWait { name: String, source: io::Error },
}

impl ExecError {
    /// Exit status contributed by the stage that failed with this error
    pub fn status(&self) -> i32 {
        match self {
            ExecError::CommandNotFound(_) => 127,
            ExecError::FailedToSpawn { .. } => 126,
            _ => 1,
        }
    }
}

/// Error type for errors which occur during state operations.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("could not determine the home directory")]
    NoHomeDirectory,
    #[error("failed to read configuration file: {0}")]
    FailedToReadConfigFile(#[source] io::Error),
    #[error("{}:{line}: malformed configuration line", path.display())]
    MalformedConfigLine { path: PathBuf, line: usize },
    #[error("{}:{line}: unknown configuration key '{key}'", path.display())]
    UnknownConfigKey {
        path: PathBuf,
        line: usize,
        key: String,
    },
    #[error("{}:{line}: invalid value '{value}' for '{key}'", path.display())]
    InvalidConfigValue {
        path: PathBuf,
        line: usize,
        key: String,
        value: String,
    },
    #[error("failed to load history: {0}")]
    FailedToLoadHistory(#[source] io::Error),
    #[error("failed to save history: {0}")]
    FailedToSaveHistory(#[source] io::Error),
}
