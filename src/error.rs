//! Errors raised while loading parser configuration.
//!
//! Parsing itself never fails; only the configuration surface does.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An empty fragment would classify every model as a reasoning model.
    #[error("reasoning model pattern at index {index} is empty")]
    EmptyModelPattern { index: usize },

    /// A zero threshold would accept any non-empty heading section.
    #[error("min_heuristic_thinking_chars must be greater than zero")]
    ZeroHeuristicThreshold,

    #[error("reasoning model pattern {0:?} is listed more than once")]
    DuplicateModelPattern(String),
}
