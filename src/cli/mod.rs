//! Command-line interface components
//!
//! This module contains CLI-specific code for ESGF Request, including
//! argument parsing, the reconcile command and confirmation prompts.

pub mod args;
pub mod commands;
pub mod prompt;

pub use args::{Cli, FilterArgs, GlobalArgs};
pub use commands::{apply_overrides, handle_reconcile};
pub use prompt::confirm;
