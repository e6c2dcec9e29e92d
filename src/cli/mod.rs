pub mod commands;
pub mod core;
pub mod io;
pub mod output;
pub mod registry;
pub mod screen;
mod shell;

pub use shell::{run_cli, SCRIPT_ENV};
