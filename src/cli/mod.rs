//! Command-line interface

pub mod args;
pub mod commands;
mod progress;

pub use args::{Cli, Commands};
