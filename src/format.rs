//! Catalog of reasoning delimiter conventions.
//!
//! Every convention the parsers understand lives here as static data: an
//! ordered list of tag pairs, the fenced, bracket and horizontal-rule
//! delimiters, and the header / colon-prefixed matchers. All matchers are
//! compiled once on first use and never mutated afterwards.

use std::fmt;
use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which delimiter convention produced a parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasoningFormat {
    /// `<think>...</think>` (DeepSeek R1, QwQ, Qwen3, MiniMax)
    ThinkTags,
    /// `<thinking>...</thinking>`
    ThinkingTags,
    /// `<reasoning>...</reasoning>`
    ReasoningTags,
    /// `<analysis>...</analysis>`
    AnalysisTags,
    /// `<reflection>...</reflection>`
    ReflectionTags,
    /// `<thought>...</thought>`
    ThoughtTags,
    /// `<scratchpad>...</scratchpad>`
    ScratchpadTags,
    /// `<inner_thoughts>...</inner_thoughts>`
    InnerThoughtsTags,
    /// ```` ```thinking ```` fenced block
    Fenced,
    /// `[Thinking]...[/Thinking]`
    Bracket,
    /// `--- THINKING --- ... --- END THINKING ---`
    HorizontalRule,
    /// `## Thinking` style heading. Colon-prefixed matches also report this
    /// unless the parser is configured to tell them apart.
    Header,
    /// Bare `Thinking:` line followed by an `Answer:` line.
    ColonPrefixed,
}

impl ReasoningFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThinkTags => "think-tags",
            Self::ThinkingTags => "thinking-tags",
            Self::ReasoningTags => "reasoning-tags",
            Self::AnalysisTags => "analysis-tags",
            Self::ReflectionTags => "reflection-tags",
            Self::ThoughtTags => "thought-tags",
            Self::ScratchpadTags => "scratchpad-tags",
            Self::InnerThoughtsTags => "inner-thoughts-tags",
            Self::Fenced => "fenced",
            Self::Bracket => "bracket",
            Self::HorizontalRule => "horizontal-rule",
            Self::Header => "header",
            Self::ColonPrefixed => "colon-prefixed",
        }
    }
}

impl fmt::Display for ReasoningFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag-pair conventions in priority order. The first entry wins when a text
/// contains more than one.
pub const TAG_NAMES: [(ReasoningFormat, &str); 8] = [
    (ReasoningFormat::ThinkTags, "think"),
    (ReasoningFormat::ThinkingTags, "thinking"),
    (ReasoningFormat::ReasoningTags, "reasoning"),
    (ReasoningFormat::AnalysisTags, "analysis"),
    (ReasoningFormat::ReflectionTags, "reflection"),
    (ReasoningFormat::ThoughtTags, "thought"),
    (ReasoningFormat::ScratchpadTags, "scratchpad"),
    (ReasoningFormat::InnerThoughtsTags, "inner_thoughts"),
];

/// Words accepted after a fence marker to open a fenced reasoning block.
const FENCE_WORDS: [&str; 2] = ["thinking", "reasoning"];

/// An open/close marker pair. The reasoning body runs from the end of the
/// first open match to the start of the first close match after it.
#[derive(Debug)]
pub struct Delimiter {
    pub format: ReasoningFormat,
    open: Regex,
    close: Regex,
    /// Literal spellings of the open marker, lowercase.
    open_literals: Vec<String>,
    /// Literal spelling of the close marker, lowercase.
    close_literal: String,
    /// Longest byte length an open or close match can have.
    /// `usize::MAX` when the pattern is unbounded.
    max_marker_len: usize,
}

impl Delimiter {
    /// Same-named `<name>` / `</name>` pair, ASCII case-insensitive.
    fn tag_pair(format: ReasoningFormat, name: &str) -> Self {
        Self::literal(format, &format!("<{name}>"), &format!("</{name}>"))
    }

    fn literal(format: ReasoningFormat, open: &str, close: &str) -> Self {
        Self {
            format,
            open: Regex::new(&format!("(?i-u){}", regex::escape(open))).unwrap(),
            close: Regex::new(&format!("(?i-u){}", regex::escape(close))).unwrap(),
            open_literals: vec![open.to_ascii_lowercase()],
            close_literal: close.to_ascii_lowercase(),
            max_marker_len: open.len().max(close.len()),
        }
    }

    /// A fence at the start of a line followed by one of `FENCE_WORDS`,
    /// closed by the same fence at the start of a later line.
    fn fence(fence: &str) -> Self {
        let fence_re = regex::escape(fence);
        let open_literals: Vec<String> = FENCE_WORDS
            .iter()
            .map(|word| format!("{fence}{word}"))
            .collect();
        let max_marker_len = open_literals.iter().map(String::len).max().unwrap_or(0);
        Self {
            format: ReasoningFormat::Fenced,
            open: Regex::new(&format!(
                "(?im-u)^{fence_re}(?:{})",
                FENCE_WORDS.join("|")
            ))
            .unwrap(),
            close: Regex::new(&format!("(?m-u)^{fence_re}")).unwrap(),
            open_literals,
            close_literal: fence.to_string(),
            max_marker_len,
        }
    }

    fn horizontal_rule() -> Self {
        Self {
            format: ReasoningFormat::HorizontalRule,
            open: Regex::new(r"(?i-u)---\s*THINKING\s*---").unwrap(),
            close: Regex::new(r"(?i-u)---\s*END\s+THINKING\s*---").unwrap(),
            open_literals: vec!["--- thinking ---".to_string()],
            close_literal: "--- end thinking ---".to_string(),
            max_marker_len: usize::MAX,
        }
    }

    /// Byte span of the first open marker at or after `from`.
    pub fn find_open(&self, text: &str, from: usize) -> Option<Range<usize>> {
        self.open.find_at(text, from).map(|m| m.range())
    }

    /// Byte span of the first close marker at or after `from`.
    pub fn find_close(&self, text: &str, from: usize) -> Option<Range<usize>> {
        self.close.find_at(text, from).map(|m| m.range())
    }

    pub fn open_literals(&self) -> impl Iterator<Item = &str> {
        self.open_literals.iter().map(String::as_str)
    }

    pub fn close_literal(&self) -> &str {
        &self.close_literal
    }

    pub fn max_marker_len(&self) -> usize {
        self.max_marker_len
    }
}

lazy_static! {
    pub static ref TAG_PAIRS: Vec<Delimiter> = TAG_NAMES
        .iter()
        .map(|(format, name)| Delimiter::tag_pair(*format, name))
        .collect();

    pub static ref FENCES: Vec<Delimiter> = vec![Delimiter::fence("```"), Delimiter::fence("~~~")];

    pub static ref BRACKET: Delimiter =
        Delimiter::literal(ReasoningFormat::Bracket, "[Thinking]", "[/Thinking]");

    pub static ref HORIZONTAL_RULE: Delimiter = Delimiter::horizontal_rule();

    /// `#`, `##` or `###` heading naming a reasoning section.
    pub static ref HEADER_OPEN: Regex = Regex::new(
        r"(?im)^(#{1,3})[ \t]+(?:thinking|reasoning|thought|analysis)[:.]?[ \t]*\r?$"
    )
    .unwrap();

    /// Next heading of exactly level 1, 2 and 3 respectively.
    pub static ref HEADER_SAME_LEVEL: [Regex; 3] = [
        Regex::new(r"(?m)^#[ \t]").unwrap(),
        Regex::new(r"(?m)^##[ \t]").unwrap(),
        Regex::new(r"(?m)^###[ \t]").unwrap(),
    ];

    /// Blank line followed by a horizontal rule or bold text.
    pub static ref HEADER_BREAK: Regex =
        Regex::new(r"\n[ \t]*\r?\n[ \t]*(?:-{3,}|\*{3,}|_{3,}|\*\*)").unwrap();

    pub static ref COLON_OPEN: Regex = Regex::new(
        r"(?im)^[ \t]*(?:internal reasoning|thinking|reasoning|thought|analysis):[ \t]*\r?$"
    )
    .unwrap();

    pub static ref COLON_CLOSE: Regex =
        Regex::new(r"(?im)^[ \t]*(?:answer|response|output|final|result|conclusion):").unwrap();

    /// Longest marker among the delimiters the streaming parser detects.
    pub static ref STREAM_LOOKBACK: usize = streaming_delimiters()
        .map(Delimiter::max_marker_len)
        .max()
        .unwrap_or(0);
}

/// Delimiters the streaming parser can detect, in detection order: tag
/// pairs, then fences, then the bracket pair.
pub fn streaming_delimiters() -> impl Iterator<Item = &'static Delimiter> {
    TAG_PAIRS
        .iter()
        .chain(FENCES.iter())
        .chain(std::iter::once(&*BRACKET))
}

/// Delimiters the batch parser tries before the heading heuristics, in
/// priority order.
pub fn batch_delimiters() -> impl Iterator<Item = &'static Delimiter> {
    streaming_delimiters().chain(std::iter::once(&*HORIZONTAL_RULE))
}
