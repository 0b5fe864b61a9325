//! Separates LLM reasoning ("thinking") text from final answer content.
//!
//! Two entry points share one catalog of delimiter conventions:
//! [`parse_reasoning`] for complete responses and
//! [`StreamingReasoningParser`] for token streams. [`is_likely_reasoning_model`]
//! guesses from a model id whether parsing is worth doing at all.

pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod heuristic;
pub mod metrics;
pub mod parser;
pub mod stream;
pub mod transform;

pub use config::ParserConfig;
pub use error::ConfigError;
pub use format::ReasoningFormat;
pub use heuristic::is_likely_reasoning_model;
pub use parser::{parse_reasoning, parse_reasoning_value, parse_reasoning_with, ParsedReasoning};
pub use stream::{Phase, StreamingReasoningParser, TokenResult};
pub use transform::{ReasoningTransformer, Transformer};
