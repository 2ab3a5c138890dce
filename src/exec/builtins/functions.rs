use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;

use super::args::{
    ChangeDirectoryArgs, ClearTerminalArgs, ExitArgs, HelpArgs, HistoryArgs, TypeArgs,
    WorkingDirectoryArgs,
};
use super::{Context, Outcome};
use crate::errors::{BuiltinError, Handle};
use crate::state::{expand_home, home_directory, resolve_executable, EnvVar};

// Parses a builtin's arguments with clap, returning early on `--help` or a usage error
macro_rules! parse_args {
    ($args_type:ty, $context:expr, $args:expr) => {
        match <$args_type>::try_parse_from($args) {
            Ok(arguments) => arguments,
            Err(error) => return clap_outcome(error, $context),
        }
    };
}

fn clap_outcome(error: clap::Error, context: &mut Context) -> Result<Outcome, BuiltinError> {
    match error.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
            write!(context.stdout, "{}", error)?;
            Ok(Outcome::Status(0))
        }
        _ => Err(BuiltinError::Usage(error.to_string())),
    }
}

pub fn exit(context: &mut Context, args: &[String]) -> Result<Outcome, BuiltinError> {
    let arguments = parse_args!(ExitArgs, context, args);
    let code = arguments.code.as_deref().map_or(0, parse_exit_code);
    Ok(Outcome::Exit(code))
}

pub fn echo(context: &mut Context, args: &[String]) -> Result<Outcome, BuiltinError> {
    writeln!(context.stdout, "{}", args.get(1..).unwrap_or_default().join(" "))?;
    Ok(Outcome::Status(0))
}

pub fn working_directory(context: &mut Context, args: &[String]) -> Result<Outcome, BuiltinError> {
    let _ = parse_args!(WorkingDirectoryArgs, context, args);
    let cwd = env::current_dir().map_err(BuiltinError::CurrentDirectoryUnavailable)?;
    writeln!(context.stdout, "{}", cwd.display())?;
    Ok(Outcome::Status(0))
}

pub fn change_directory(context: &mut Context, args: &[String]) -> Result<Outcome, BuiltinError> {
    let arguments = parse_args!(ChangeDirectoryArgs, context, args);
    let home = || home_directory().replace_err(|| BuiltinError::MissingEnvironmentVariable(EnvVar::Home));

    let target = match arguments.path.as_deref() {
        None | Some("~") => home()?,
        Some(path) if path.starts_with("~/") => expand_home(path, &home()?),
        Some(path) => PathBuf::from(path),
    };

    // The directory is validated here so that a pipeline stage reports the same errors,
    // even though only a foreground `cd` actually changes directory
    match target.metadata() {
        Ok(metadata) if metadata.is_dir() => Ok(Outcome::ChangeDirectory(target)),
        Ok(_) => Err(BuiltinError::NotADirectory(target)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(BuiltinError::UnknownDirectory(target)),
        Err(source) => Err(BuiltinError::ChangeDirectoryFailed {
            path: target,
            source,
        }),
    }
}

pub fn type_of(context: &mut Context, args: &[String]) -> Result<Outcome, BuiltinError> {
    let arguments = parse_args!(TypeArgs, context, args);
    // * A missing PATH behaves exactly like a PATH with nothing in it
    let search_path = EnvVar::Path.get().unwrap_or_default();
    let mut status = 0;

    for name in &arguments.names {
        if context.builtins.contains(name) {
            writeln!(context.stdout, "{} is a shell builtin", name)?;
        } else if let Some(path) = resolve_executable(name, &search_path) {
            writeln!(context.stdout, "{} is {}", name, path.display())?;
        } else {
            writeln!(context.stdout, "{}: not found", name)?;
            status = 1;
        }
    }

    Ok(Outcome::Status(status))
}

pub fn history(context: &mut Context, args: &[String]) -> Result<Outcome, BuiltinError> {
    let arguments = parse_args!(HistoryArgs, context, args);
    let history = &context.shell.history;
    let skip = arguments
        .count
        .map_or(0, |count| history.len().saturating_sub(count));

    for (index, entry) in history.iter().enumerate().skip(skip) {
        writeln!(context.stdout, "{:>5}  {}", index + 1, entry)?;
    }

    Ok(Outcome::Status(0))
}

pub fn help(context: &mut Context, args: &[String]) -> Result<Outcome, BuiltinError> {
    let _ = parse_args!(HelpArgs, context, args);
    let width = context.builtins.iter().map(|b| b.name.len()).max().unwrap_or(0);
    for builtin in context.builtins.iter() {
        writeln!(context.stdout, "{:<width$}  {}", builtin.name, builtin.description)?;
    }

    Ok(Outcome::Status(0))
}

pub fn clear_terminal(context: &mut Context, args: &[String]) -> Result<Outcome, BuiltinError> {
    let _ = parse_args!(ClearTerminalArgs, context, args);
    let stdout: &mut dyn Write = &mut *context.stdout;
    stdout
        .queue(Clear(ClearType::All))
        .and_then(|stdout| stdout.queue(MoveTo(0, 0)))
        .and_then(|stdout| stdout.flush())
        .map_err(BuiltinError::TerminalOperationFailed)?;

    Ok(Outcome::Status(0))
}

/// Converts an `exit` argument the way C's `atoi` does
/// * Leading whitespace and one sign are accepted, then the longest run of digits is used
/// * Anything without leading digits, or too large to represent, becomes 0
pub fn parse_exit_code(code: &str) -> i32 {
    let code = code.trim_start();
    let (sign, unsigned) = match code.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, code.strip_prefix('+').unwrap_or(code)),
    };

    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    unsigned[..digits_end]
        .parse::<i32>()
        .map_or(0, |value| sign * value)
}
