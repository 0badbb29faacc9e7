//! Resource limits applied while compiling a formula.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_MAX_DEPTH: usize = 100;
pub const DEFAULT_MAX_STRING_LITERAL_LENGTH: usize = 10_000;

/// Limits shared by the parser, builder and type checker.
///
/// Missing keys fall back to their defaults when deserializing:
///
/// ```
/// use formula_lang::config::Limits;
///
/// let limits = Limits::from_json_str(r#"{ "max_depth": 64 }"#).unwrap();
/// assert_eq!(limits.max_depth, 64);
/// assert_eq!(limits.max_string_literal_length, 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Deepest nesting of calls, brackets and operators.
    pub max_depth: usize,
    /// Longest string literal, counted in characters after unescaping.
    pub max_string_literal_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_literal_length: DEFAULT_MAX_STRING_LITERAL_LENGTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Limits {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads limits from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let limits = Self::from_json_str(&contents)?;
        debug!(
            path = %path.display(),
            max_depth = limits.max_depth,
            max_string_literal_length = limits.max_string_literal_length,
            "loaded formula limits"
        );
        Ok(limits)
    }
}
