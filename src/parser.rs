//! Batch reasoning parser.
//!
//! Tries every known convention against a complete text in priority order
//! and returns the first that matches. Never fails: text without any
//! recognizable reasoning comes back unchanged as content.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::config::ParserConfig;
use crate::extract::{extract_colon_prefixed, extract_delimited, extract_header, Extraction};
use crate::format::{batch_delimiters, ReasoningFormat};

/// Reasoning/content split of a model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReasoning {
    /// Reasoning text with markers stripped and whitespace trimmed.
    pub thinking: String,
    /// Everything that is not reasoning.
    pub content: String,
    /// `true` iff `thinking` is non-empty.
    pub has_thinking: bool,
    /// Convention that matched, `None` when nothing did.
    pub format: Option<ReasoningFormat>,
}

impl ParsedReasoning {
    /// Result for text with no recognized reasoning.
    pub fn none(text: &str) -> Self {
        Self {
            content: text.to_string(),
            ..Default::default()
        }
    }

    fn matched(extraction: Extraction, format: ReasoningFormat) -> Self {
        Self {
            has_thinking: extraction.has_thinking(),
            thinking: extraction.thinking,
            content: extraction.content,
            format: Some(format),
        }
    }
}

/// Parse `text` with the default configuration.
pub fn parse_reasoning(text: &str) -> ParsedReasoning {
    parse_reasoning_with(text, &ParserConfig::default())
}

/// Parse a JSON value. Non-string values yield an empty, format-less result.
pub fn parse_reasoning_value(value: &Value) -> ParsedReasoning {
    match value {
        Value::String(text) => parse_reasoning(text),
        _ => ParsedReasoning::default(),
    }
}

pub fn parse_reasoning_with(text: &str, config: &ParserConfig) -> ParsedReasoning {
    // Explicit delimiters only count once terminated.
    for delimiter in batch_delimiters() {
        let extraction = extract_delimited(text, delimiter);
        if extraction.closed {
            trace!(format = %delimiter.format, "Matched delimited reasoning");
            return ParsedReasoning::matched(extraction, delimiter.format);
        }
    }

    let min_chars = config.min_heuristic_thinking_chars;

    let header = extract_header(text);
    if header.closed && header.thinking.chars().count() > min_chars {
        trace!("Matched header reasoning section");
        return ParsedReasoning::matched(header, ReasoningFormat::Header);
    }
    if header.closed {
        trace!(
            chars = header.thinking.chars().count(),
            min_chars,
            "Header section too short, ignoring"
        );
    }

    let colon = extract_colon_prefixed(text);
    if colon.closed && colon.thinking.chars().count() > min_chars {
        let format = if config.distinguish_colon_format {
            ReasoningFormat::ColonPrefixed
        } else {
            ReasoningFormat::Header
        };
        trace!(format = %format, "Matched colon-prefixed reasoning section");
        return ParsedReasoning::matched(colon, format);
    }

    ParsedReasoning::none(text)
}
