//! Streaming reasoning parser.
//!
//! Consumes a model response token by token and exposes the best-known
//! thinking/content split after every token. Markers may straddle token
//! boundaries, so detection always runs against the accumulated buffer;
//! a resume cursor keeps each scan limited to the new tail plus the
//! longest marker.

use std::ops::Range;

use serde::Serialize;
use tracing::trace;

use crate::extract::join_outside;
use crate::format::{streaming_delimiters, Delimiter, ReasoningFormat, STREAM_LOOKBACK};
use crate::parser::ParsedReasoning;

/// Where the parser is within the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// No open marker seen yet; everything is content.
    #[default]
    Scanning,
    /// Open marker seen, close marker not yet.
    InThinking,
    /// Close marker seen. Terminal.
    AfterThinking,
}

/// Snapshot returned from every [`StreamingReasoningParser::process_token`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResult {
    pub thinking: String,
    pub content: String,
    pub is_in_thinking: bool,
    pub format: Option<ReasoningFormat>,
}

/// Per-response streaming state. One instance per in-flight stream; feed
/// tokens in the order they were produced.
#[derive(Debug, Default)]
pub struct StreamingReasoningParser {
    buffer: String,
    thinking: String,
    content: String,
    phase: Phase,
    delimiter: Option<&'static Delimiter>,
    open: Range<usize>,
    close: Range<usize>,
}

impl StreamingReasoningParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `token` and return the current split.
    pub fn process_token(&mut self, token: &str) -> TokenResult {
        let prev_len = self.buffer.len();
        self.buffer.push_str(token);

        match self.phase {
            Phase::Scanning => self.detect_open(prev_len),
            Phase::InThinking => self.seek_close(prev_len),
            Phase::AfterThinking => self.refresh_content(),
        }

        TokenResult {
            thinking: self.thinking.clone(),
            content: self.content.clone(),
            is_in_thinking: self.phase == Phase::InThinking,
            format: self.format(),
        }
    }

    /// Current state in the batch result shape.
    pub fn get_result(&self) -> ParsedReasoning {
        ParsedReasoning {
            thinking: self.thinking.clone(),
            content: self.content.clone(),
            has_thinking: !self.thinking.is_empty(),
            format: self.format(),
        }
    }

    /// Clear all buffers and return to [`Phase::Scanning`]. Allocations are
    /// kept for the next response.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.thinking.clear();
        self.content.clear();
        self.phase = Phase::Scanning;
        self.delimiter = None;
        self.open = 0..0;
        self.close = 0..0;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn format(&self) -> Option<ReasoningFormat> {
        self.delimiter.map(|delimiter| delimiter.format)
    }

    /// Everything fed so far, untouched.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Byte span of the open marker within [`buffer`](Self::buffer).
    pub fn open_span(&self) -> Option<Range<usize>> {
        self.delimiter.map(|_| self.open.clone())
    }

    /// Byte span of the close marker within [`buffer`](Self::buffer).
    pub fn close_span(&self) -> Option<Range<usize>> {
        (self.phase == Phase::AfterThinking).then(|| self.close.clone())
    }

    /// The open marker as it appeared in the stream.
    pub fn open_marker(&self) -> Option<&str> {
        self.open_span().map(|span| &self.buffer[span])
    }

    /// The close marker as it appeared in the stream.
    pub fn close_marker(&self) -> Option<&str> {
        self.close_span().map(|span| &self.buffer[span])
    }

    /// Length of a buffer suffix that could be the start of the next marker
    /// (an open marker while scanning, the close marker while thinking).
    ///
    /// Consumers forwarding deltas hold these bytes back, since they may
    /// turn out to be markup rather than text.
    pub fn pending_marker_len(&self) -> usize {
        match (self.phase, self.delimiter) {
            (Phase::Scanning, _) => streaming_delimiters()
                .flat_map(|delimiter| delimiter.open_literals())
                .map(|marker| trailing_partial_len(&self.buffer, marker))
                .max()
                .unwrap_or(0),
            (Phase::InThinking, Some(delimiter)) => trailing_partial_len(
                &self.buffer[self.open.end..],
                delimiter.close_literal(),
            ),
            _ => 0,
        }
    }

    fn detect_open(&mut self, prev_len: usize) {
        let from = floor_char_boundary(&self.buffer, prev_len.saturating_sub(*STREAM_LOOKBACK));
        let found = streaming_delimiters()
            .find_map(|delimiter| Some((delimiter, delimiter.find_open(&self.buffer, from)?)));

        let Some((delimiter, open)) = found else {
            self.content.push_str(&self.buffer[prev_len..]);
            return;
        };

        trace!(format = %delimiter.format, offset = open.start, "Reasoning block opened");
        self.content.clear();
        self.content.push_str(self.buffer[..open.start].trim());
        self.delimiter = Some(delimiter);
        self.phase = Phase::InThinking;
        let open_end = open.end;
        self.open = open;
        self.seek_close(open_end);
    }

    fn seek_close(&mut self, prev_len: usize) {
        let Some(delimiter) = self.delimiter else {
            return;
        };
        let from = floor_char_boundary(
            &self.buffer,
            prev_len.saturating_sub(*STREAM_LOOKBACK).max(self.open.end),
        );

        self.thinking.clear();
        match delimiter.find_close(&self.buffer, from) {
            Some(close) => {
                trace!(format = %delimiter.format, offset = close.start, "Reasoning block closed");
                self.thinking
                    .push_str(self.buffer[self.open.end..close.start].trim());
                self.close = close;
                self.phase = Phase::AfterThinking;
                self.refresh_content();
            }
            None => self.thinking.push_str(self.buffer[self.open.end..].trim()),
        }
    }

    fn refresh_content(&mut self) {
        self.content = join_outside(
            &self.buffer[..self.open.start],
            &self.buffer[self.close.end..],
        );
    }
}

/// Length of the longest proper prefix of `marker` that `text` ends with,
/// ignoring ASCII case.
fn trailing_partial_len(text: &str, marker: &str) -> usize {
    let max_len = marker.len().saturating_sub(1).min(text.len());
    for len in (1..=max_len).rev() {
        let Some(suffix) = text.get(text.len() - len..) else {
            continue;
        };
        if marker[..len].eq_ignore_ascii_case(suffix) {
            return len;
        }
    }
    0
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
