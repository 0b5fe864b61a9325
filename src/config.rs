use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

use crate::error::ConfigError;
use crate::heuristic::is_likely_reasoning_model_with;

/// Tunables for the batch parser and the model heuristic.
///
/// Every field has a default, so an empty JSON object is a valid config and
/// `ParserConfig::default()` reproduces the stock behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// Header and colon-prefixed sections are accepted only when their body
    /// is strictly longer than this many characters.
    #[serde(default = "default_min_heuristic_thinking_chars")]
    pub min_heuristic_thinking_chars: usize,

    /// Report colon-prefixed matches as `colon-prefixed` instead of folding
    /// them into `header`.
    #[serde(default)]
    pub distinguish_colon_format: bool,

    /// Extra model-id fragments treated as reasoning models, matched
    /// case-insensitively.
    #[serde(default)]
    pub extra_reasoning_model_patterns: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_heuristic_thinking_chars: default_min_heuristic_thinking_chars(),
            distinguish_colon_format: false,
            extra_reasoning_model_patterns: Vec::new(),
        }
    }
}

impl ParserConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).context(format!("Failed to read config file: {}", path))?;
        let config = Self::from_json(&content)?;
        debug!(
            path,
            min_heuristic_thinking_chars = config.min_heuristic_thinking_chars,
            extra_patterns = config.extra_reasoning_model_patterns.len(),
            "Loaded parser config"
        );
        Ok(config)
    }

    /// Parse, normalize and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: ParserConfig =
            serde_json::from_str(json).context("Failed to parse config JSON")?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Lowercase and trim model patterns so matching stays case-insensitive.
    pub fn normalize(&mut self) {
        for pattern in &mut self.extra_reasoning_model_patterns {
            *pattern = pattern.trim().to_lowercase();
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.min_heuristic_thinking_chars == 0 {
            return Err(ConfigError::ZeroHeuristicThreshold);
        }
        for (index, pattern) in self.extra_reasoning_model_patterns.iter().enumerate() {
            if pattern.is_empty() {
                return Err(ConfigError::EmptyModelPattern { index });
            }
            if self.extra_reasoning_model_patterns[..index].contains(pattern) {
                return Err(ConfigError::DuplicateModelPattern(pattern.clone()));
            }
        }
        Ok(())
    }

    /// Model heuristic including this config's extra patterns.
    pub fn is_likely_reasoning_model(&self, model_id: &str) -> bool {
        is_likely_reasoning_model_with(model_id, &self.extra_reasoning_model_patterns)
    }
}

fn default_min_heuristic_thinking_chars() -> usize {
    50
}
