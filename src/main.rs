use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use simplelog::WriteLogger;

use pipesh::state::config_directory;
use pipesh::eval::read_eval_loop;
use pipesh::{Configuration, Dispatcher, LineEditor, ShellState};

#[derive(Parser, Debug)]
#[command(name = "pipesh", version, about = "A small command shell with pipelines and redirections")]
struct Cli {
    #[arg(short, long, value_name = "LINE", help = "Run a single line and exit with its status")]
    command: Option<String>,
    #[arg(long, value_name = "PATH", help = "Read the configuration from PATH")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "LEVEL", value_parser = parse_level, help = "Override the configured log level")]
    log_level: Option<LevelFilter>,
    #[arg(long, help = "Neither load nor save the command history")]
    no_history: bool,
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .parse()
        .map_err(|_| format!("'{}' is not one of off, error, warn, info, debug, trace", level))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref());
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    init_logger(config.log_level);

    // The ShellState type stores all of the state for the shell, including its configuration
    // and the command history
    let mut shell = match cli.no_history {
        true => ShellState::ephemeral(config),
        false => ShellState::new(config),
    };
    if let Err(e) = shell.load_history() {
        log::warn!("{}", e);
        eprintln!("pipesh: {}", e);
    }

    // The Dispatcher type is responsible for splitting lines into pipelines and running them,
    // either as builtins inside the shell or as child processes
    let dispatcher = Dispatcher::default();

    if let Some(line) = cli.command {
        let status = dispatcher.eval(&mut shell, &line);
        save_history(&shell);
        process::exit(status);
    }

    // The LineEditor type is responsible for reading lines of input from the user
    // and providing line-editing features
    let mut line_editor = LineEditor::new(&shell.history)?;

    let status = read_eval_loop(&mut shell, &dispatcher, |shell| {
        line_editor.prompt_and_read_line(shell)
    })?;
    process::exit(status)
}

// Falls back to defaults if the configuration cannot be used, after saying why
fn load_config(path: Option<&std::path::Path>) -> Configuration {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match config_directory() {
            Ok(dir) => dir.join("config"),
            Err(e) => {
                eprintln!("pipesh: {}", e);
                return Configuration::default();
            }
        },
    };

    Configuration::load(&path).unwrap_or_else(|e| {
        eprintln!("pipesh: {}, using the default configuration", e);
        Configuration::default()
    })
}

// Logs go to a file so they never mix with command output
fn init_logger(level: LevelFilter) {
    if level == LevelFilter::Off {
        return;
    }

    let file = config_directory()
        .map_err(anyhow::Error::from)
        .and_then(|dir| {
            fs_err::create_dir_all(&dir)?;
            let file = fs_err::OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("pipesh.log"))?;
            Ok(file)
        });

    let result = match file {
        Ok(file) => WriteLogger::init(level, simplelog::Config::default(), file)
            .map_err(|e| anyhow::anyhow!("{}", e)),
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("pipesh: failed to start logging: {}", e);
    }
}

fn save_history(shell: &ShellState) {
    if let Err(e) = shell.save_history() {
        log::warn!("{}", e);
        eprintln!("pipesh: {}", e);
    }
}
