/*
A quick write-up on builtins:
Builtins are commands that run inside the shell process instead of being spawned as children.
Some of them (cd, exit) only make sense this way, because a child process cannot change the
working directory of its parent or terminate it.

Builtin functions never touch process-wide state themselves. They read the shell state, write to
the streams they are given, and return an `Outcome` describing any state change they want.
The caller decides whether to apply it: a builtin run on its own applies it, while a builtin
inside a multi-stage pipeline behaves like it is running in a subshell and discards it.
 */

pub mod args;
pub mod functions;

use std::io::Write;
use std::path::PathBuf;

use crate::errors::BuiltinError;
use crate::state::ShellState;

/// Everything a builtin function can see while it runs
pub struct Context<'a> {
    pub shell: &'a ShellState,
    pub builtins: &'a Builtins,
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

/// What a builtin asks of the shell once it has finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing beyond an exit status
    Status(i32),
    /// Change the shell's working directory (already validated to be a directory)
    ChangeDirectory(PathBuf),
    /// Save history and terminate the shell with the given code
    Exit(i32),
}

pub type BuiltinFn = fn(&mut Context, &[String]) -> Result<Outcome, BuiltinError>;

/// Represents a builtin function, its name and a one-line description for `help`
pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
    function: BuiltinFn,
}

impl Builtin {
    pub fn new(name: &'static str, description: &'static str, function: BuiltinFn) -> Self {
        Self {
            name,
            description,
            function,
        }
    }

    /// Runs the builtin with its full argument vector (argument 0 is the builtin's name)
    pub fn run(&self, context: &mut Context, args: &[String]) -> Result<Outcome, BuiltinError> {
        (self.function)(context, args)
    }
}

/// Represents the collection of builtin commands
/// Allows for builtin resolution by exact name
pub struct Builtins {
    commands: Vec<Builtin>,
}

impl Default for Builtins {
    /// Initializes the collection with the default shell builtins
    #[rustfmt::skip]
    fn default() -> Self {
        let mut builtins = Self::new();

        builtins.add("exit", "Save history and exit the shell with an optional status code", functions::exit);
        builtins.add("echo", "Write the arguments to standard output", functions::echo);
        builtins.add("pwd", "Print the current working directory", functions::working_directory);
        builtins.add("cd", "Change the working directory (defaults to $HOME)", functions::change_directory);
        builtins.add("type", "Describe how each name would be interpreted as a command", functions::type_of);
        builtins.add("history", "List the command history, optionally only the last N entries", functions::history);
        builtins.add("help", "List the shell builtins", functions::help);
        builtins.add("clear", "Clear the terminal screen", functions::clear_terminal);

        builtins
    }
}

impl Builtins {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Adds a builtin to the collection
    pub fn add(&mut self, name: &'static str, description: &'static str, function: BuiltinFn) {
        self.commands.push(Builtin::new(name, description, function))
    }

    /// Attempts to locate a builtin command by its exact name
    pub fn resolve(&self, command_name: &str) -> Option<&Builtin> {
        self.commands
            .iter()
            .find(|command| command.name == command_name)
    }

    pub fn contains(&self, command_name: &str) -> bool {
        self.resolve(command_name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.commands.iter()
    }
}
