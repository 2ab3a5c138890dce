use std::env;
use std::io::{self, Write};
use std::path::Path;

use super::parser::{split_logical, split_pipeline, Command};
use super::tokenizer::tokenize;
use crate::errors::BuiltinError;
use crate::exec::{report, run_pipeline, Builtin, Builtins, Context, Outcome, StdioGuard};
use crate::state::ShellState;

/// Evaluates lines of input: splits them into logical groups and pipelines,
/// then runs each pipeline either as a foreground builtin or as a set of processes
pub struct Dispatcher {
    builtins: Builtins,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Builtins::default())
    }
}

impl Dispatcher {
    pub fn new(builtins: Builtins) -> Self {
        Self { builtins }
    }

    /// Evaluates one line and returns its exit status
    /// * The status is also stored as the shell's last status
    /// * Errors never escape: they are reported on stderr and turned into a status
    pub fn eval(&self, shell: &mut ShellState, line: &str) -> i32 {
        shell.record(line);

        let mut status = 0;
        for group in split_logical(tokenize(line)) {
            if !group.operator.should_run(status) {
                log::debug!("skipping {:?} group after status {}", group.operator, status);
                continue;
            }

            let commands = split_pipeline(group.tokens);
            // * An empty group (e.g. after a trailing operator) leaves the status as it was
            if commands.is_empty() {
                continue;
            }

            log::debug!("evaluating {:?}", commands);
            status = self.run(shell, &commands);
            log::debug!("pipeline finished with status {}", status);
        }

        shell.last_status = status;
        status
    }

    fn run(&self, shell: &mut ShellState, commands: &[Command]) -> i32 {
        if let [command] = commands {
            if let Some(builtin) = command.name().and_then(|name| self.builtins.resolve(name)) {
                return self.run_builtin(shell, builtin, command);
            }
        }

        run_pipeline(shell, &self.builtins, commands)
    }

    /// Runs a builtin in the foreground, with the shell's own standard streams redirected
    /// for the duration of the call, and applies the outcome to the shell
    fn run_builtin(&self, shell: &mut ShellState, builtin: &Builtin, command: &Command) -> i32 {
        let guard = match StdioGuard::redirect(command) {
            Ok(guard) => guard,
            Err(e) => return report(&e),
        };

        let (mut stdout, mut stderr) = (io::stdout(), io::stderr());
        let mut context = Context {
            shell: &*shell,
            builtins: &self.builtins,
            stdout: &mut stdout,
            stderr: &mut stderr,
        };
        let result = builtin.run(&mut context, &command.args);

        let status = match result {
            Ok(Outcome::Status(status)) => status,
            Ok(Outcome::ChangeDirectory(path)) => change_directory(&path, &mut stderr),
            Ok(Outcome::Exit(code)) => {
                // Restore the real streams so that anything reported while exiting is visible
                drop(guard);
                exit_shell(shell, code)
            }
            Err(e) => {
                e.report(builtin.name, &mut stderr);
                1
            }
        };

        if let Err(e) = stdout.flush() {
            log::debug!("failed to flush builtin output: {}", e);
        }
        drop(guard);
        status
    }
}

fn change_directory(path: &Path, stderr: &mut dyn Write) -> i32 {
    match env::set_current_dir(path) {
        Ok(()) => {
            log::debug!("changed directory to {}", path.display());
            0
        }
        Err(source) => {
            BuiltinError::ChangeDirectoryFailed {
                path: path.to_path_buf(),
                source,
            }
            .report("cd", stderr);
            1
        }
    }
}

/// Saves history and terminates the process
/// * A failure to save is reported but never prevents the exit
fn exit_shell(shell: &ShellState, code: i32) -> ! {
    if let Err(e) = shell.save_history() {
        log::warn!("{}", e);
        eprintln!("exit: {}", e);
    }

    let _ = io::stdout().flush();
    log::info!("exiting with status {}", code);
    std::process::exit(code)
}
