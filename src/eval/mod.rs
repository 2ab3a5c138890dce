pub mod dispatcher;
pub mod readline;
mod parser;
mod tokenizer;

pub use dispatcher::Dispatcher;
pub use parser::{
    extract_redirections, split_logical, split_pipeline, Command, LogicalGroup, LogicalOperator,
    OutputTarget, WriteMode,
};
pub use readline::{read_eval_loop, LineEditor, ReadOutcome};
pub use tokenizer::{tokenize, Token};
