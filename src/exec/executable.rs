use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command as Process, ExitStatus, Stdio};

use crate::errors::ExecError;

/// Represents an executable (external command) along with its wired standard streams
/// * The name is resolved through `PATH` by the operating system when the process is spawned
pub struct Executable<'a> {
    args: &'a [String],
    stdin: Stdio,
    stdout: Stdio,
    stderr: Stdio,
}

impl<'a> Executable<'a> {
    /// Creates an executable whose streams are inherited from the shell
    pub fn new(args: &'a [String]) -> Self {
        Self {
            args,
            stdin: Stdio::inherit(),
            stdout: Stdio::inherit(),
            stderr: Stdio::inherit(),
        }
    }

    pub fn stdin(mut self, stdin: impl Into<Stdio>) -> Self {
        self.stdin = stdin.into();
        self
    }

    pub fn stdout(mut self, stdout: impl Into<Stdio>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn stderr(mut self, stderr: impl Into<Stdio>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn name(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    /// Starts the process without waiting for it
    /// * The `Stdio` handles are consumed here, so the shell's copies of any pipe ends
    /// * or redirection files are closed as soon as this returns
    pub fn spawn(self) -> Result<Child, ExecError> {
        let name = self.name().to_owned();
        // * `std::process::Command` adds the executable name as argument 0 by itself
        let mut process = Process::new(&name);
        process
            .args(self.args.iter().skip(1))
            .stdin(self.stdin)
            .stdout(self.stdout)
            .stderr(self.stderr);

        process.spawn().map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ExecError::CommandNotFound(name.clone()),
            _ => ExecError::FailedToSpawn {
                name: name.clone(),
                source,
            },
        })
    }

}

/// Blocks until the child terminates and converts how it terminated into a shell status
pub fn wait(child: &mut Child, name: &str) -> Result<i32, ExecError> {
    let status = child.wait().map_err(|source| ExecError::FailedToWait {
        name: name.to_owned(),
        source,
    })?;

    let code = status_code(status);
    log::debug!("{} (pid {}) exited with status {}", name, child.id(), code);
    Ok(code)
}

/// Converts an exit status into the 8-bit convention shells report
/// * A process killed by a signal reports 128 plus the signal number
pub fn status_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        // * Neither an exit code nor a signal should be impossible on unix
        (None, None) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &[&str]) -> Vec<String> {
        line.iter().map(|a| a.to_string()).collect()
    }

    trait RunToCompletion {
        fn run(self) -> Result<i32, ExecError>;
    }

    impl RunToCompletion for Executable<'_> {
        fn run(self) -> Result<i32, ExecError> {
            let name = self.name().to_owned();
            let mut child = self.spawn()?;
            wait(&mut child, &name)
        }
    }

    #[test]
    fn runs_and_reports_exit_codes() {
        assert_eq!(Executable::new(&args(&["true"])).run().unwrap(), 0);
        assert_eq!(Executable::new(&args(&["false"])).run().unwrap(), 1);
        let code = Executable::new(&args(&["sh", "-c", "exit 42"])).run().unwrap();
        assert_eq!(code, 42);
    }

    #[test]
    fn missing_command_is_not_found() {
        let err = Executable::new(&args(&["pipesh-no-such-command"]))
            .run()
            .unwrap_err();
        assert!(matches!(err, ExecError::CommandNotFound(_)));
        assert_eq!(err.status(), 127);
        assert_eq!(err.to_string(), "pipesh-no-such-command: command not found");
    }

    #[test]
    fn signalled_child_reports_128_plus_signal() {
        let code = Executable::new(&args(&["sh", "-c", "kill -9 $$"]))
            .run()
            .unwrap();
        assert_eq!(code, 128 + 9);
    }

    #[test]
    fn output_can_be_redirected_to_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let file = std::fs::File::create(&path).unwrap();
        let code = Executable::new(&args(&["echo", "hello"]))
            .stdout(file)
            .run()
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
