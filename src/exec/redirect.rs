use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::path::Path;

use crate::errors::ExecError;
use crate::eval::{Command, OutputTarget, WriteMode};

/// Opens the file a `<` redirection reads from
pub fn open_input(path: &Path) -> Result<File, ExecError> {
    File::open(path).map_err(|source| ExecError::FailedToOpenRedirect {
        path: path.to_path_buf(),
        source,
    })
}

/// Opens the file a `>`/`>>` style redirection writes to, creating it if needed
pub fn open_output(target: &OutputTarget) -> Result<File, ExecError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true);
    match target.mode {
        WriteMode::Truncate => options.truncate(true),
        WriteMode::Append => options.append(true),
    };

    options
        .open(&target.path)
        .map_err(|source| ExecError::FailedToOpenRedirect {
            path: target.path.clone(),
            source,
        })
}

/// The files a command's redirections refer to, opened in stdin/stdout/stderr order
#[derive(Debug, Default)]
pub struct RedirectFiles {
    pub stdin: Option<File>,
    pub stdout: Option<File>,
    pub stderr: Option<File>,
}

impl RedirectFiles {
    /// Opens every redirection of the command, stopping at the first failure
    pub fn open(command: &Command) -> Result<Self, ExecError> {
        Ok(Self {
            stdin: command.stdin.as_deref().map(open_input).transpose()?,
            stdout: command.stdout.as_ref().map(open_output).transpose()?,
            stderr: command.stderr.as_ref().map(open_output).transpose()?,
        })
    }
}

/// Standard stream descriptors a builtin can have swapped out from under it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdin,
    Stdout,
    Stderr,
}

impl Stream {
    fn fd(self) -> RawFd {
        match self {
            Stream::Stdin => libc::STDIN_FILENO,
            Stream::Stdout => libc::STDOUT_FILENO,
            Stream::Stderr => libc::STDERR_FILENO,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Stream::Stdin => "stdin",
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Scoped replacement of the process's own standard streams, used to redirect builtins
/// * Each swapped stream is saved as a duplicate first and restored when the guard drops,
/// * so the originals come back on every exit path, including early returns and errors
#[derive(Debug, Default)]
pub struct StdioGuard {
    saved: Vec<(Stream, OwnedFd)>,
}

impl StdioGuard {
    /// Binds the process's standard streams to the command's redirection targets
    /// If any redirection fails, the streams swapped so far are restored before returning
    pub fn redirect(command: &Command) -> Result<Self, ExecError> {
        let mut guard = Self::default();
        if !command.has_redirections() {
            return Ok(guard);
        }

        if let Some(path) = &command.stdin {
            guard.swap(Stream::Stdin, &open_input(path)?)?;
        }

        if let Some(target) = &command.stdout {
            guard.swap(Stream::Stdout, &open_output(target)?)?;
        }

        if let Some(target) = &command.stderr {
            guard.swap(Stream::Stderr, &open_output(target)?)?;
        }

        Ok(guard)
    }

    fn swap(&mut self, stream: Stream, file: &impl AsFd) -> Result<(), ExecError> {
        let swap_err = |source| ExecError::FailedToSwapDescriptor {
            stream: stream.name(),
            source,
        };

        flush_buffered_output();
        let saved = duplicate(stream.fd()).map_err(swap_err)?;
        replace(file.as_fd().as_raw_fd(), stream.fd()).map_err(swap_err)?;
        log::trace!("swapped {} for a redirection", stream.name());
        self.saved.push((stream, saved));
        Ok(())
    }
}

impl Drop for StdioGuard {
    fn drop(&mut self) {
        if self.saved.is_empty() {
            return;
        }

        flush_buffered_output();
        // Restore in reverse order of acquisition
        while let Some((stream, saved)) = self.saved.pop() {
            if let Err(e) = replace(saved.as_raw_fd(), stream.fd()) {
                log::error!("failed to restore {}: {}", stream.name(), e);
            }
            // `saved` is closed here, leaving the restored descriptor as the only owner
        }
    }
}

// Anything still sitting in Rust's stdout buffer belongs to whichever descriptor was
// current when it was written, so it has to reach that descriptor before a swap
fn flush_buffered_output() {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}

// Duplicates a raw descriptor into a new owned, close-on-exec descriptor
fn duplicate(fd: RawFd) -> io::Result<OwnedFd> {
    // SAFETY: the standard stream descriptors are open for the lifetime of the process
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    borrowed.try_clone_to_owned()
}

// Makes `target` refer to the same open file as `source`
fn replace(source: RawFd, target: RawFd) -> io::Result<()> {
    // SAFETY: dup2 only manipulates the descriptor table; both descriptors are valid here
    match unsafe { libc::dup2(source, target) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::path::PathBuf;

    #[test]
    fn truncate_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let target = |mode| OutputTarget {
            path: path.clone(),
            mode,
        };

        writeln!(open_output(&target(WriteMode::Truncate)).unwrap(), "first").unwrap();
        writeln!(open_output(&target(WriteMode::Truncate)).unwrap(), "hi").unwrap();
        writeln!(open_output(&target(WriteMode::Append)).unwrap(), "hi").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hi\nhi\n");
    }

    #[test]
    fn input_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_input(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ExecError::FailedToOpenRedirect { .. }));
        assert_eq!(err.status(), 1);
    }

    #[test]
    fn opens_all_redirections_of_a_command() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::write(&input, "data").unwrap();
        let command = Command {
            args: vec!["cat".to_owned()],
            stdin: Some(input),
            stdout: Some(OutputTarget {
                path: dir.path().join("out"),
                mode: WriteMode::Truncate,
            }),
            stderr: None,
        };

        let files = RedirectFiles::open(&command).unwrap();
        let mut contents = String::new();
        files.stdin.unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "data");
        assert!(files.stdout.is_some());
        assert!(files.stderr.is_none());
        assert!(dir.path().join("out").exists());
    }

    #[test]
    fn failed_open_reports_the_path() {
        let command = Command {
            args: vec!["cat".to_owned()],
            stdin: Some(PathBuf::from("/definitely/not/here")),
            ..Command::default()
        };
        let err = RedirectFiles::open(&command).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here"));
    }

    #[test]
    fn guard_without_redirections_is_a_no_op() {
        let guard = StdioGuard::redirect(&Command::default()).unwrap();
        assert!(guard.saved.is_empty());
    }
}
