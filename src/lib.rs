//! A small command shell: tokenizing, redirections, `&&`/`||` chains, pipelines and builtins

pub mod errors;
pub mod eval;
pub mod exec;
pub mod state;

pub use eval::{Dispatcher, LineEditor, ReadOutcome};
pub use state::{Configuration, ShellState};
