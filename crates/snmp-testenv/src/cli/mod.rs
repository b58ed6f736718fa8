//! CLI plumbing: arguments, setup and output

mod args;
pub mod output;
pub mod setup;

pub use args::{Cli, Command};
