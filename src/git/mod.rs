pub mod commands;
pub mod runner;

pub use runner::{CommandResult, CommandRunner, ShellRunner};
