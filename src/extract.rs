//! Single-convention extraction over a complete text.
//!
//! Each function looks for exactly one convention and reports what it
//! found. Absence of a match is an ordinary outcome, not an error.

use crate::format::{
    Delimiter, COLON_CLOSE, COLON_OPEN, HEADER_BREAK, HEADER_OPEN, HEADER_SAME_LEVEL,
};

/// Split of a text under one convention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Trimmed reasoning body, markers stripped.
    pub thinking: String,
    /// Everything outside the reasoning span.
    pub content: String,
    /// The opening marker was present.
    pub found: bool,
    /// The block was terminated. Heading conventions count as closed
    /// whenever they capture a non-empty body.
    pub closed: bool,
}

impl Extraction {
    fn not_found(text: &str) -> Self {
        Self {
            content: text.to_string(),
            ..Default::default()
        }
    }

    pub fn has_thinking(&self) -> bool {
        !self.thinking.is_empty()
    }
}

/// `trim(before + after)` without an intermediate allocation when one side
/// is blank.
pub(crate) fn join_outside(before: &str, after: &str) -> String {
    if before.trim().is_empty() {
        return after.trim().to_string();
    }
    if after.trim().is_empty() {
        return before.trim().to_string();
    }
    format!("{before}{after}").trim().to_string()
}

/// Extract the first block delimited by `delimiter`.
///
/// Without an open marker the whole text is content. With an open marker
/// but no close marker everything after the open marker is thinking and
/// content is empty; callers decide whether an unterminated block counts.
pub fn extract_delimited(text: &str, delimiter: &Delimiter) -> Extraction {
    let Some(open) = delimiter.find_open(text, 0) else {
        return Extraction::not_found(text);
    };

    match delimiter.find_close(text, open.end) {
        Some(close) => Extraction {
            thinking: text[open.end..close.start].trim().to_string(),
            content: join_outside(&text[..open.start], &text[close.end..]),
            found: true,
            closed: true,
        },
        None => Extraction {
            thinking: text[open.end..].trim().to_string(),
            content: String::new(),
            found: true,
            closed: false,
        },
    }
}

/// Extract a `## Thinking` style section.
///
/// The section ends at the next heading of the same level, at a blank line
/// followed by a horizontal rule or bold text, or at end of input.
pub fn extract_header(text: &str) -> Extraction {
    let Some(caps) = HEADER_OPEN.captures(text) else {
        return Extraction::not_found(text);
    };
    let (Some(heading), Some(hashes)) = (caps.get(0), caps.get(1)) else {
        return Extraction::not_found(text);
    };

    let body_start = heading.end();
    let same_level = &HEADER_SAME_LEVEL[hashes.len() - 1];
    let body_end = [
        same_level.find_at(text, body_start).map(|m| m.start()),
        HEADER_BREAK.find_at(text, body_start).map(|m| m.start()),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(text.len());

    let thinking = text[body_start..body_end].trim();
    if thinking.is_empty() {
        return Extraction::not_found(text);
    }

    Extraction {
        thinking: thinking.to_string(),
        content: join_outside(&text[..heading.start()], &text[body_end..]),
        found: true,
        closed: true,
    }
}

/// Extract a section introduced by a bare `Thinking:` line and ended by an
/// `Answer:` style label. The label itself is dropped from the content.
pub fn extract_colon_prefixed(text: &str) -> Extraction {
    let Some(label) = COLON_OPEN.find(text) else {
        return Extraction::not_found(text);
    };

    let (body_end, rest_start) = match COLON_CLOSE.find_at(text, label.end()) {
        Some(answer) => (answer.start(), answer.end()),
        None => (text.len(), text.len()),
    };

    let thinking = text[label.end()..body_end].trim();
    if thinking.is_empty() {
        return Extraction::not_found(text);
    }

    Extraction {
        thinking: thinking.to_string(),
        content: join_outside(&text[..label.start()], &text[rest_start..]),
        found: true,
        closed: true,
    }
}
