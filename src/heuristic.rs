//! Model-id heuristic for reasoning-capable models.
//!
//! Callers use this to decide whether running the reasoning parser on a
//! response is worthwhile. It only looks at the identifier string.

/// Model family fragments with known reasoning checkpoints.
pub const REASONING_FAMILY_PATTERNS: &[&str] = &[
    "deepseek-r1",
    "deepseek_r1",
    "deepseek-reasoner",
    "r1-distill",
    "qwq",
    "qwen3",
    "gpt-oss",
    "magistral",
    "exaone-deep",
    "sky-t1",
    "skywork-or1",
    "glm-z1",
    "minimax-m1",
    "kimi-k1.5",
    "claude-3-7",
    "claude-sonnet-4",
    "claude-opus-4",
    "gemini-2.5",
    "grok-3-mini",
];

/// OpenAI o-series names. Too short for substring matching, so they must
/// start a path segment and be followed by the end or a separator.
pub const O_SERIES_PREFIXES: &[&str] = &["o1", "o3", "o4"];

/// Generic keyword fragments that mark a reasoning variant of any family.
pub const REASONING_KEYWORD_PATTERNS: &[&str] = &[
    "reasoning",
    "reasoner",
    "thinking",
    "-think",
    "-r1",
    "-cot",
];

/// Guess whether `model_id` emits reasoning content.
///
/// Case-insensitive substring match against the built-in fragments, plus
/// segment-anchored o-series names. Empty or unrecognized identifiers are
/// `false`.
pub fn is_likely_reasoning_model(model_id: &str) -> bool {
    is_likely_reasoning_model_with(model_id, &[])
}

/// Same as [`is_likely_reasoning_model`], also accepting caller-supplied
/// lowercase fragments.
pub fn is_likely_reasoning_model_with(model_id: &str, extra_patterns: &[String]) -> bool {
    let model_lower = model_id.to_lowercase();
    REASONING_FAMILY_PATTERNS
        .iter()
        .chain(REASONING_KEYWORD_PATTERNS)
        .any(|pattern| model_lower.contains(*pattern))
        || O_SERIES_PREFIXES
            .iter()
            .any(|prefix| starts_segment(&model_lower, prefix))
        || extra_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && model_lower.contains(pattern.as_str()))
}

/// `prefix` opens one of the `/` or `:` separated segments of `model_lower`.
fn starts_segment(model_lower: &str, prefix: &str) -> bool {
    model_lower.split(['/', ':']).any(|segment| {
        segment
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['-', '_', '.']))
    })
}
