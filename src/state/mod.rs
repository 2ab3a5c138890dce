mod config;
mod environment;
mod history;
mod path;
mod shell;

pub use config::{config_directory, Configuration};
pub use environment::{home_directory, EnvVar};
pub use history::{History, HistoryStore};
pub use path::{expand_home, is_executable, resolve_executable};
pub use shell::ShellState;
