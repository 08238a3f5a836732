#![forbid(unsafe_code)]

//! The `cyclegrid` binary: CLI, logging, the interactive visualizer, and the
//! one-shot `dump` command.

pub mod app;
pub mod cli;
pub mod dump;
pub mod error;
pub mod logging;
pub mod view;

pub use cli::{Cli, Commands, Settings, run, run_from_env};
pub use error::{AppError, Result};
