use std::path::PathBuf;
use std::str::FromStr;

use strum::EnumString;

use super::tokenizer::Token;

/// How an output redirection opens its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// An output redirection target: the file and how it is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub mode: WriteMode,
}

/// The redirection operators recognized anywhere in a command's arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
enum RedirectOperator {
    #[strum(serialize = "<")]
    Stdin,
    #[strum(serialize = ">", serialize = "1>")]
    Stdout,
    #[strum(serialize = ">>", serialize = "1>>")]
    StdoutAppend,
    #[strum(serialize = "2>")]
    Stderr,
    #[strum(serialize = "2>>")]
    StderrAppend,
}

/// A single command: its argument vector and the files its standard streams are bound to
/// * Argument 0 is the program or builtin name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub args: Vec<String>,
    pub stdin: Option<PathBuf>,
    pub stdout: Option<OutputTarget>,
    pub stderr: Option<OutputTarget>,
}

impl Command {
    /// The program or builtin name, if there is one
    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn has_redirections(&self) -> bool {
        self.stdin.is_some() || self.stdout.is_some() || self.stderr.is_some()
    }
}

/// The operator that conditions whether a logical group runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum LogicalOperator {
    #[strum(disabled)]
    None,
    #[strum(serialize = "&&")]
    And,
    #[strum(serialize = "||")]
    Or,
}

impl LogicalOperator {
    /// Decides if a group introduced by this operator runs, given the previous status
    pub fn should_run(self, previous_status: i32) -> bool {
        match self {
            LogicalOperator::None => true,
            LogicalOperator::And => previous_status == 0,
            LogicalOperator::Or => previous_status != 0,
        }
    }
}

/// The tokens of one pipeline together with the operator that introduced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalGroup {
    pub operator: LogicalOperator,
    pub tokens: Vec<Token>,
}

/// Removes redirection operators and their file arguments from a command's tokens
/// Returns the command along with the positions of the tokens that were consumed
/// * An operator with no following token is left in place as a regular argument
/// * If a stream is redirected more than once, the last redirection wins
pub fn extract_redirections(tokens: Vec<Token>) -> (Command, Vec<usize>) {
    let mut command = Command::default();
    let mut removed = Vec::new();
    let mut tokens = tokens.into_iter().enumerate();

    while let Some((position, token)) = tokens.next() {
        let operator = token
            .as_operator()
            .and_then(|text| RedirectOperator::from_str(text).ok());

        let Some(operator) = operator else {
            command.args.push(token.into_string());
            continue;
        };

        let Some((target_position, target)) = tokens.next() else {
            command.args.push(token.into_string());
            break;
        };
        removed.extend([position, target_position]);

        let path = PathBuf::from(target.into_string());
        let output = |mode| Some(OutputTarget { path: path.clone(), mode });
        match operator {
            RedirectOperator::Stdin => command.stdin = Some(path.clone()),
            RedirectOperator::Stdout => command.stdout = output(WriteMode::Truncate),
            RedirectOperator::StdoutAppend => command.stdout = output(WriteMode::Append),
            RedirectOperator::Stderr => command.stderr = output(WriteMode::Truncate),
            RedirectOperator::StderrAppend => command.stderr = output(WriteMode::Append),
        }
    }

    (command, removed)
}

/// Splits a line's tokens into groups joined by `&&` and `||`
/// * The first group is always introduced by `LogicalOperator::None`
/// * A trailing operator produces an empty final group
pub fn split_logical(tokens: Vec<Token>) -> Vec<LogicalGroup> {
    let mut groups = Vec::new();
    let mut current = LogicalGroup {
        operator: LogicalOperator::None,
        tokens: Vec::new(),
    };

    for token in tokens {
        let operator = token
            .as_operator()
            .and_then(|text| LogicalOperator::from_str(text).ok());

        match operator {
            Some(operator) => {
                let finished = std::mem::replace(
                    &mut current,
                    LogicalGroup {
                        operator,
                        tokens: Vec::new(),
                    },
                );
                groups.push(finished);
            }
            None => current.tokens.push(token),
        }
    }

    groups.push(current);
    groups
}

/// Splits one logical group's tokens at `|` into commands, extracting their redirections
/// * Empty slices (leading, trailing or doubled pipes) are dropped rather than becoming commands
pub fn split_pipeline(tokens: Vec<Token>) -> Vec<Command> {
    let mut slices: Vec<Vec<Token>> = vec![Vec::new()];

    for token in tokens {
        if token.as_operator() == Some("|") {
            slices.push(Vec::new());
        } else if let Some(slice) = slices.last_mut() {
            slice.push(token);
        }
    }

    slices
        .into_iter()
        .filter(|slice| !slice.is_empty())
        .map(|slice| extract_redirections(slice).0)
        .collect()
}
