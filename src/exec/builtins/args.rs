use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "exit", about = "Save history and exit the shell")]
pub struct ExitArgs {
    // * Kept as a string: non-numeric codes are accepted and coerced like C's atoi
    #[arg(allow_hyphen_values = true, help = "The status code to exit with (default 0)")]
    pub code: Option<String>,
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub ignored: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(name = "pwd", about = "Print the current working directory")]
pub struct WorkingDirectoryArgs {
    // * Options such as `-L` and `-P` are accepted and have no effect
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub ignored: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(name = "cd", about = "Change the working directory")]
pub struct ChangeDirectoryArgs {
    #[arg(
        allow_hyphen_values = true,
        help = "The path of the directory to switch to (default $HOME)"
    )]
    pub path: Option<String>,
    // * Only the first path is used
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub ignored: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(name = "type", about = "Describe how each name would be interpreted")]
pub struct TypeArgs {
    #[arg(required = true, help = "The command names to look up")]
    pub names: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(name = "history", about = "List the command history")]
pub struct HistoryArgs {
    #[arg(help = "Only list the last N entries")]
    pub count: Option<usize>,
}

#[derive(Parser, Debug)]
#[command(name = "help", about = "List the shell builtins")]
pub struct HelpArgs {}

#[derive(Parser, Debug)]
#[command(name = "clear", about = "Clear the terminal screen")]
pub struct ClearTerminalArgs {}
