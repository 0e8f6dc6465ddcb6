pub mod commands;
mod context;
pub mod output;
mod shell;

pub use context::{CliError, ShellContext};
pub use shell::run_cli;
