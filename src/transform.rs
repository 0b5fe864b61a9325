//! Response transformer that moves reasoning into `reasoning_content`.
//!
//! Works on OpenAI-style bodies (`choices[].message` and streaming
//! `choices[].delta`) and on Anthropic-style bodies with a top-level
//! `content` string or array of text blocks.

use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

use crate::config::ParserConfig;
use crate::metrics;
use crate::parser::{parse_reasoning_with, ParsedReasoning};
use crate::stream::{Phase, StreamingReasoningParser};

/// Core trait for response transformers.
pub trait Transformer: Send + Sync {
    /// Apply transformation to an outgoing response.
    ///
    /// Returns a modified response or an error if transformation fails.
    fn transform_response(&self, response: Value) -> Result<Value> {
        Ok(response)
    }

    /// Get the transformer's name for logging and debugging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Forwarding position within one channel (content or reasoning) of a
/// streamed choice.
///
/// `cursor` is a byte offset into the parser's raw buffer; everything
/// before it has been taken. Whitespace is held back at the edges so the
/// concatenated deltas come out trimmed the way the batch split is.
#[derive(Debug, Default)]
struct Forwarded {
    cursor: usize,
    held: String,
    started: bool,
}

impl Forwarded {
    /// Raw buffer text inside `regions` that lies past the cursor.
    fn take(&mut self, buffer: &str, regions: &[Range<usize>]) -> String {
        let mut raw = String::new();
        for region in regions {
            let start = region.start.max(self.cursor);
            if start < region.end {
                raw.push_str(&buffer[start..region.end]);
                self.cursor = region.end;
            }
        }
        raw
    }

    /// Append `raw` and release everything up to its last non-whitespace
    /// character. Leading whitespace is dropped unless `keep_leading`.
    fn release(&mut self, raw: &str, keep_leading: bool) -> String {
        self.held.push_str(raw);
        let body_end = self.held.trim_end().len();
        if body_end == 0 {
            return String::new();
        }
        let released: String = self.held.drain(..body_end).collect();
        if self.started || keep_leading {
            self.started = true;
            return released;
        }
        self.started = true;
        released.trim_start().to_string()
    }
}

/// One streaming choice: its parser plus what has already been forwarded.
#[derive(Debug, Default)]
struct StreamSlot {
    parser: StreamingReasoningParser,
    content: Forwarded,
    thinking: Forwarded,
}

impl StreamSlot {
    /// Feed a delta and return the newly visible `(content, thinking)`.
    fn advance(&mut self, chunk: &str) -> (String, String) {
        self.parser.process_token(chunk);
        let held = self.parser.pending_marker_len();
        self.forward(held)
    }

    /// Flush what is still held once the choice has finished.
    ///
    /// A stream that never opened a reasoning block passes through
    /// untouched, so its trailing whitespace and any marker-like tail are
    /// released. Otherwise edge whitespace is dropped as in the batch split.
    fn finish(&mut self) -> (String, String) {
        let (mut content, thinking) = self.forward(0);
        if self.parser.phase() == Phase::Scanning {
            content.push_str(&std::mem::take(&mut self.content.held));
        }
        (content, thinking)
    }

    /// Forward buffer text outside the marker spans as content and text
    /// between them as thinking, stopping `held` bytes short of the end.
    fn forward(&mut self, held: usize) -> (String, String) {
        let buffer = self.parser.buffer();
        let end = buffer.len().saturating_sub(held);

        let (content_regions, thinking_region) =
            match (self.parser.open_span(), self.parser.close_span()) {
                (None, _) => (vec![0..end], None),
                (Some(open), None) => (vec![0..open.start], Some(open.end..end.max(open.end))),
                (Some(open), Some(close)) => (
                    vec![0..open.start, close.end..buffer.len()],
                    Some(open.end..close.start),
                ),
            };

        let keep_leading = self.parser.phase() == Phase::Scanning;
        let raw_content = self.content.take(buffer, &content_regions);
        let content = self.content.release(&raw_content, keep_leading);

        let thinking = match thinking_region {
            Some(region) => {
                let raw_thinking = self.thinking.take(buffer, &[region]);
                self.thinking.release(&raw_thinking, false)
            }
            None => String::new(),
        };

        (content, thinking)
    }
}

/// Splits reasoning out of response text into `reasoning_content`.
///
/// Complete messages go through the batch parser. Streaming deltas keep a
/// [`StreamingReasoningParser`] per choice index until that choice reports
/// a `finish_reason`.
#[derive(Debug, Default)]
pub struct ReasoningTransformer {
    config: ParserConfig,
    streams: Arc<Mutex<HashMap<u64, StreamSlot>>>,
}

impl ReasoningTransformer {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            streams: Arc::default(),
        }
    }

    /// Drop all in-flight stream state.
    pub fn reset_streams(&self) {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of choices with an open stream.
    pub fn active_streams(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn parse(&self, text: &str) -> ParsedReasoning {
        let parsed = parse_reasoning_with(text, &self.config);
        metrics::record_parse(&parsed);
        parsed
    }

    fn process_message(&self, parent: &mut Value) {
        let Some(obj) = parent.as_object_mut() else {
            return;
        };
        let Some(content_val) = obj.get("content").cloned() else {
            return;
        };

        let (new_content, reasoning) = match content_val {
            Value::String(s) => {
                let parsed = self.parse(&s);
                if parsed.format.is_none() {
                    return;
                }
                let reasoning = parsed.has_thinking.then_some(parsed.thinking);
                (Value::String(parsed.content), reasoning)
            }
            Value::Array(blocks) => {
                let mut all_reasoning = Vec::new();
                let new_blocks: Vec<Value> = blocks
                    .into_iter()
                    .map(|mut block| {
                        let Some(text_str) = block.get("text").and_then(Value::as_str) else {
                            return block;
                        };
                        let parsed = self.parse(text_str);
                        if parsed.format.is_none() {
                            return block;
                        }
                        if parsed.has_thinking {
                            all_reasoning.push(parsed.thinking);
                        }
                        if let Some(block_obj) = block.as_object_mut() {
                            block_obj.insert("text".to_string(), Value::String(parsed.content));
                        }
                        block
                    })
                    .collect();

                let reasoning = (!all_reasoning.is_empty()).then(|| all_reasoning.join("\n"));
                (Value::Array(new_blocks), reasoning)
            }
            _ => return,
        };

        obj.insert("content".to_string(), new_content);
        if let Some(extracted) = reasoning {
            merge_reasoning(obj, extracted);
        }
    }

    fn process_delta(&self, index: u64, delta: &mut Value, finished: bool) {
        let mut streams = self
            .streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let chunk = delta.get("content").and_then(Value::as_str).map(str::to_owned);
        let (mut content, mut thinking) = match &chunk {
            Some(chunk) => {
                metrics::record_stream_token();
                streams.entry(index).or_default().advance(chunk)
            }
            None => (String::new(), String::new()),
        };

        if finished {
            if let Some(mut slot) = streams.remove(&index) {
                let (rest_content, rest_thinking) = slot.finish();
                content.push_str(&rest_content);
                thinking.push_str(&rest_thinking);
                let result = slot.parser.get_result();
                trace!(index, format = ?result.format, "Stream finished");
                metrics::record_parse(&result);
            }
        }

        let Some(obj) = delta.as_object_mut() else {
            return;
        };
        if chunk.is_some() || !content.is_empty() {
            obj.insert("content".to_string(), Value::String(content));
        }
        if !thinking.is_empty() {
            merge_reasoning(obj, thinking);
        }
    }
}

/// Clones share the config but start with no in-flight streams.
impl Clone for ReasoningTransformer {
    fn clone(&self) -> Self {
        Self::new(self.config.clone())
    }
}

fn merge_reasoning(obj: &mut serde_json::Map<String, Value>, extracted: String) {
    let merged = match obj.get("reasoning_content").and_then(Value::as_str) {
        Some(existing) if !existing.is_empty() => format!("{existing}\n{extracted}"),
        _ => extracted,
    };
    obj.insert("reasoning_content".to_string(), Value::String(merged));
}

impl Transformer for ReasoningTransformer {
    fn name(&self) -> &str {
        "reasoning"
    }

    fn transform_response(&self, mut response: Value) -> Result<Value> {
        trace!(response = ?response, "Starting reasoning transform");

        if let Some(choices) = response.get_mut("choices").and_then(|c| c.as_array_mut()) {
            for (position, choice) in choices.iter_mut().enumerate() {
                let index = choice
                    .get("index")
                    .and_then(Value::as_u64)
                    .unwrap_or(position as u64);
                let finished = choice
                    .get("finish_reason")
                    .is_some_and(|reason| !reason.is_null());
                if let Some(message) = choice.get_mut("message") {
                    self.process_message(message);
                }
                if let Some(delta) = choice.get_mut("delta") {
                    self.process_delta(index, delta, finished);
                }
            }
        } else {
            self.process_message(&mut response);
        }

        trace!(response = ?response, "Finished reasoning transform");
        Ok(response)
    }
}
