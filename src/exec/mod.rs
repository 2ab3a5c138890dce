pub mod builtins;
mod executable;
mod pipeline;
mod redirect;

pub use builtins::{Builtin, Builtins, Context, Outcome};
pub use executable::{status_code, Executable};
pub use pipeline::{report, run_pipeline};
pub use redirect::{RedirectFiles, StdioGuard};
