//! CLI support for formula-lang
//!
//! Provides programmatic access to the `formula` commands for embedding in
//! other tools.

mod check;
mod convert;
mod docs;

pub use check::{
    CheckOptions, CheckResult, execute_check, execute_deps, execute_fmt, execute_rename,
};
pub use convert::{error_to_json, load_schema, to_json};
pub use docs::{get_docs_overview, get_topic};

use std::io;

use thiserror::Error;

use crate::{config::ConfigError, error::FormulaError};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Error with formula: {0}")]
    Formula(#[from] FormulaError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No formula provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,

    #[error("Unknown topic: '{0}'\nRun 'formula docs' to see available topics.")]
    UnknownTopic(String),
}
