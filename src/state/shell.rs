use std::env;

use crossterm::style::Stylize;

use super::config::Configuration;
use super::environment::home_directory;
use super::history::{History, HistoryStore};
use super::path::collapse_home;
use crate::errors::StateError;

/// Represents the shell state and provides methods for interacting with it
/// * The working directory is not stored here, it is delegated to the operating system
pub struct ShellState {
    pub config: Configuration,
    pub history: History,
    pub last_status: i32,
    history_store: Option<HistoryStore>,
}

impl ShellState {
    pub fn new(config: Configuration) -> Self {
        let history = History::new(config.history_limit);
        let history_store = config.history_file.clone().map(HistoryStore::new);

        Self {
            config,
            history,
            last_status: 0,
            history_store,
        }
    }

    /// Creates a shell that neither loads nor saves its history
    pub fn ephemeral(config: Configuration) -> Self {
        let mut shell = Self::new(config);
        shell.history_store = None;
        shell
    }

    /// Seeds the in-memory history from the history store, if there is one
    pub fn load_history(&mut self) -> Result<(), StateError> {
        if let Some(store) = &self.history_store {
            let entries = store.load()?;
            log::debug!("loaded {} history entries from {}", entries.len(), store.path().display());
            self.history.extend(entries);
        }

        Ok(())
    }

    /// Writes the in-memory history to the history store, if there is one
    pub fn save_history(&self) -> Result<(), StateError> {
        if let Some(store) = &self.history_store {
            store.save(&self.history.to_vec())?;
            log::debug!("saved {} history entries to {}", self.history.len(), store.path().display());
        }

        Ok(())
    }

    /// Records a line in the history, skipping blank lines
    pub fn record(&mut self, line: &str) {
        if !line.trim().is_empty() {
            self.history.push(line);
        }
    }

    /// Generates the prompt string used by the `LineEditor`
    pub fn generate_prompt(&self) -> String {
        let home = home_directory();
        let cwd = match env::current_dir() {
            Ok(cwd) => collapse_home(&cwd, home.as_deref()),
            // The working directory may have been deleted out from under the shell
            Err(_) => String::from("?"),
        };
        let prompt_delimiter = match self.config.multi_line_prompt {
            true => "\n",
            false => " ",
        };

        let prompt_tick = match self.last_status {
            0 => "❯".green(),
            _ => "❯".red(),
        }
        .bold();

        format!("{}{}{} ", cwd.dark_green(), prompt_delimiter, prompt_tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config_with_history(dir: &Path, limit: usize) -> Configuration {
        Configuration {
            history_limit: limit,
            history_file: Some(dir.join("history")),
            ..Configuration::default()
        }
    }

    #[test]
    fn blank_lines_are_not_recorded() {
        let mut shell = ShellState::ephemeral(Configuration::default());
        shell.record("   ");
        shell.record("");
        shell.record("ls");
        assert_eq!(shell.history.to_vec(), vec!["ls"]);
    }

    #[test]
    fn history_round_trips_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = ShellState::new(config_with_history(dir.path(), 10));
        shell.record("echo one");
        shell.record("echo two");
        shell.save_history().unwrap();

        let mut restored = ShellState::new(config_with_history(dir.path(), 10));
        restored.load_history().unwrap();
        assert_eq!(restored.history.to_vec(), vec!["echo one", "echo two"]);
    }

    #[test]
    fn loaded_history_respects_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("history"), "a\nb\nc\n").unwrap();
        let mut shell = ShellState::new(config_with_history(dir.path(), 2));
        shell.load_history().unwrap();
        assert_eq!(shell.history.to_vec(), vec!["b", "c"]);
    }

    #[test]
    fn ephemeral_shell_has_no_store() {
        let dir = tempfile::tempdir().unwrap();
        let shell = ShellState::ephemeral(config_with_history(dir.path(), 10));
        assert!(shell.history_store.is_none());
        shell.save_history().unwrap();
        assert!(!dir.path().join("history").exists());
    }
}
