use std::io::{self, PipeWriter, Write};
use std::process::{Child, Stdio};
use std::thread::{self, Scope, ScopedJoinHandle};

use super::builtins::{Builtin, Builtins, Context, Outcome};
use super::executable::{self, Executable};
use super::redirect::RedirectFiles;
use crate::errors::ExecError;
use crate::eval::Command;
use crate::state::ShellState;

type StageOutput = Box<dyn Write + Send>;

/// One running stage of a pipeline
enum Stage<'scope> {
    Process { child: Child, name: String },
    Builtin(ScopedJoinHandle<'scope, i32>),
    /// The stage never started, or had nothing to run
    Finished(i32),
}

impl Stage<'_> {
    fn wait(self) -> i32 {
        match self {
            Stage::Process { mut child, name } => {
                executable::wait(&mut child, &name).unwrap_or_else(|e| report(&e))
            }
            Stage::Builtin(handle) => handle.join().unwrap_or_else(|_| {
                log::error!("builtin pipeline stage panicked");
                1
            }),
            Stage::Finished(status) => status,
        }
    }
}

/// Runs every command of a pipeline concurrently, each stage's stdout feeding the next stage's stdin
/// * Explicit redirections take precedence over the pipe on the same stream
/// * Builtin stages run on their own threads and cannot change the shell's state
///
/// Every stage is waited for, and the status of the last stage is returned.
/// Failure to start one stage is reported and does not stop the others from running.
pub fn run_pipeline(shell: &ShellState, builtins: &Builtins, commands: &[Command]) -> i32 {
    log::debug!("running pipeline of {} stage(s)", commands.len());

    thread::scope(|scope| {
        let mut stages = Vec::with_capacity(commands.len());
        // * `None` only for the first stage, which reads from the shell's own stdin
        let mut upstream: Option<Stdio> = None;

        for (index, command) in commands.iter().enumerate() {
            let stdin = upstream.take();
            let stdout = match index + 1 < commands.len() {
                true => match io::pipe() {
                    Ok((reader, writer)) => {
                        upstream = Some(Stdio::from(reader));
                        Some(writer)
                    }
                    Err(source) => {
                        let status = report(&ExecError::FailedToCreatePipe(source));
                        upstream = Some(Stdio::null());
                        stages.push(Stage::Finished(status));
                        continue;
                    }
                },
                false => None,
            };

            stages.push(start_stage(scope, shell, builtins, command, stdin, stdout));
        }

        // * Waiting happens only after every stage has started, so no stage blocks on a full pipe
        // * whose reader has not been spawned yet
        stages.into_iter().map(Stage::wait).last().unwrap_or(0)
    })
}

fn start_stage<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    shell: &'env ShellState,
    builtins: &'env Builtins,
    command: &'env Command,
    stdin: Option<Stdio>,
    stdout: Option<PipeWriter>,
) -> Stage<'scope> {
    // * Pipe ends that go unused are dropped on every return path, so neighbours see EOF
    let files = match RedirectFiles::open(command) {
        Ok(files) => files,
        Err(e) => return Stage::Finished(report(&e)),
    };

    let Some(name) = command.name() else {
        // Nothing to run, but the redirection files have been created like in other shells
        return Stage::Finished(0);
    };

    if let Some(builtin) = builtins.resolve(name) {
        let stdout: StageOutput = match (files.stdout, stdout) {
            (Some(file), _) => Box::new(file),
            (None, Some(pipe)) => Box::new(pipe),
            (None, None) => Box::new(io::stdout()),
        };
        let stderr: StageOutput = match files.stderr {
            Some(file) => Box::new(file),
            None => Box::new(io::stderr()),
        };

        log::debug!("starting builtin stage '{}'", name);
        let handle = scope.spawn(move || {
            run_detached_builtin(builtin, shell, builtins, &command.args, stdout, stderr)
        });
        return Stage::Builtin(handle);
    }

    let mut process = Executable::new(&command.args);
    if let Some(stdin) = files.stdin.map(Stdio::from).or(stdin) {
        process = process.stdin(stdin);
    }
    if let Some(stdout) = files.stdout.map(Stdio::from).or(stdout.map(Stdio::from)) {
        process = process.stdout(stdout);
    }
    if let Some(stderr) = files.stderr {
        process = process.stderr(stderr);
    }

    match process.spawn() {
        Ok(child) => {
            log::debug!("spawned '{}' (pid {})", name, child.id());
            Stage::Process {
                child,
                name: name.to_owned(),
            }
        }
        Err(e) => Stage::Finished(report(&e)),
    }
}

/// Runs a builtin as if it were in a subshell: state changes it asks for are discarded
fn run_detached_builtin(
    builtin: &Builtin,
    shell: &ShellState,
    builtins: &Builtins,
    args: &[String],
    mut stdout: StageOutput,
    mut stderr: StageOutput,
) -> i32 {
    let mut context = Context {
        shell,
        builtins,
        stdout: &mut *stdout,
        stderr: &mut *stderr,
    };

    let status = match builtin.run(&mut context, args) {
        Ok(Outcome::Status(status)) => status,
        Ok(Outcome::ChangeDirectory(path)) => {
            log::debug!("discarding directory change to {} in pipeline", path.display());
            0
        }
        Ok(Outcome::Exit(code)) => code,
        Err(e) => {
            e.report(builtin.name, context.stderr);
            1
        }
    };

    if let Err(e) = stdout.flush() {
        log::debug!("failed to flush builtin output: {}", e);
    }
    status
}

/// Reports an execution error on the shell's stderr and returns the status it contributes
pub fn report(error: &ExecError) -> i32 {
    log::warn!("{}", error);
    eprintln!("{}", error);
    error.status()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{split_pipeline, tokenize};
    use crate::state::Configuration;

    fn run(line: &str) -> i32 {
        let shell = ShellState::ephemeral(Configuration::default());
        let builtins = Builtins::default();
        run_pipeline(&shell, &builtins, &split_pipeline(tokenize(line)))
    }

    #[test]
    fn status_is_the_last_stage() {
        assert_eq!(run("false | true"), 0);
        assert_eq!(run("true | false"), 1);
        assert_eq!(run("true | sh -c 'exit 3'"), 3);
    }

    #[test]
    fn missing_command_mid_pipeline_does_not_stop_the_rest() {
        assert_eq!(run("pipesh-no-such-command | true"), 0);
        assert_eq!(run("true | pipesh-no-such-command"), 127);
    }

    #[test]
    fn data_flows_through_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let line = format!("echo hello world | tr a-z A-Z | cat > {}", out.display());
        assert_eq!(run(&line), 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "HELLO WORLD\n");
    }

    #[test]
    fn builtin_stage_writes_into_the_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let line = format!("echo a b c | wc -w > {}", out.display());
        assert_eq!(run(&line), 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "3");
    }

    #[test]
    fn redirection_overrides_the_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let line = format!(
            "echo hi > {} | cat > {}",
            first.display(),
            second.display()
        );
        assert_eq!(run(&line), 0);
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "hi\n");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "");
    }

    #[test]
    fn builtin_exit_in_pipeline_only_sets_the_status() {
        assert_eq!(run("true | exit 5"), 5);
    }

    #[test]
    fn failed_redirection_is_status_one() {
        let dir = tempfile::tempdir().unwrap();
        let line = format!("cat < {} | true", dir.path().join("missing").display());
        assert_eq!(run(&line), 0);
        let line = format!("true | cat < {}", dir.path().join("missing").display());
        assert_eq!(run(&line), 1);
    }

    #[test]
    fn single_external_command() {
        assert_eq!(run("sh -c 'exit 7'"), 7);
    }
}
