// CLI module
// Public interface for command-line interface

mod commands;
mod repl;

pub use commands::Command;
pub use repl::{Draft, Repl};
