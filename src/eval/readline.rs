use rustyline::error::ReadlineError;
use rustyline::{CompletionType, Config, DefaultEditor};

use super::dispatcher::Dispatcher;
use crate::state::{History, ShellState};

/// What happened when the user was prompted for a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C: the partially typed line is discarded
    Interrupted,
    /// Ctrl-D on an empty line
    EndOfInput,
}

/// Reads lines of input from the terminal with line editing and arrow-key history recall
pub struct LineEditor {
    editor: DefaultEditor,
}

impl LineEditor {
    /// Creates a LineEditor whose recall history starts out as the shell's history
    pub fn new(history: &History) -> Result<Self, ReadlineError> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .build();

        let mut editor = DefaultEditor::with_config(config)?;
        for entry in history.iter() {
            // * Only fails for entries rustyline chooses to ignore, which need no handling
            let _ = editor.add_history_entry(entry.as_str());
        }

        Ok(Self { editor })
    }

    pub fn prompt_and_read_line(&mut self, shell: &ShellState) -> Result<ReadOutcome, ReadlineError> {
        match self.editor.readline(&shell.generate_prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }

                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::EndOfInput),
            Err(e) => Err(e),
        }
    }
}

/// Prompts for lines and evaluates them until end of input, returning the last status
/// * History is saved when the loop ends, including when reading fails
pub fn read_eval_loop<E>(
    shell: &mut ShellState,
    dispatcher: &Dispatcher,
    mut read_line: impl FnMut(&ShellState) -> Result<ReadOutcome, E>,
) -> Result<i32, E> {
    let result = loop {
        match read_line(&*shell) {
            Ok(ReadOutcome::Line(line)) => {
                dispatcher.eval(shell, &line);
            }
            Ok(ReadOutcome::Interrupted) => continue,
            Ok(ReadOutcome::EndOfInput) => break Ok(shell.last_status),
            Err(e) => break Err(e),
        }
    };

    if let Err(e) = shell.save_history() {
        log::warn!("{}", e);
        eprintln!("pipesh: {}", e);
    }
    result
}
