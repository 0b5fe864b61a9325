//! Integration tests for the batch parser.

use reasoning_split::format::TAG_NAMES;
use reasoning_split::{parse_reasoning, ParsedReasoning, ReasoningFormat};

const PLAIN_TEXTS: &[&str] = &[
    "",
    "The answer is 4.",
    "  leading and trailing whitespace  \n",
    "Use <b>bold</b> and <i>italics</i> in HTML.",
    "A list:\n- one\n- two\n",
    "```rust\nfn main() {}\n```",
    "## Summary\nshort",
    "I was thinking about it, and the result is 7.",
];

#[test]
fn text_without_delimiters_is_returned_unchanged() {
    for text in PLAIN_TEXTS {
        assert_eq!(
            parse_reasoning(text),
            ParsedReasoning {
                thinking: String::new(),
                content: text.to_string(),
                has_thinking: false,
                format: None,
            },
            "input: {text:?}"
        );
    }
}

#[test]
fn every_tag_pair_splits_prefix_middle_suffix() {
    let prefix = "Sure thing. ";
    let middle = "\n  weigh both sides  \n";
    let suffix = "Final answer: yes.";

    for (format, name) in TAG_NAMES {
        let text = format!("{prefix}<{name}>{middle}</{name}>{suffix}");
        let parsed = parse_reasoning(&text);
        assert_eq!(parsed.thinking, middle.trim(), "tag {name}");
        assert_eq!(
            parsed.content,
            format!("{prefix}{suffix}").trim(),
            "tag {name}"
        );
        assert!(parsed.has_thinking, "tag {name}");
        assert_eq!(parsed.format, Some(format), "tag {name}");
    }
}

#[test]
fn tag_pairs_match_regardless_of_case() {
    let parsed = parse_reasoning("<SCRATCHPAD>notes</Scratchpad>done");
    assert_eq!(parsed.format, Some(ReasoningFormat::ScratchpadTags));
    assert_eq!(parsed.thinking, "notes");
    assert_eq!(parsed.content, "done");
}

#[test]
fn think_tags_win_over_bracket_blocks() {
    let text = "[Thinking]bracketed[/Thinking]\n<think>tagged</think>\nAnswer";
    let parsed = parse_reasoning(text);
    assert_eq!(parsed.format, Some(ReasoningFormat::ThinkTags));
    assert_eq!(parsed.thinking, "tagged");
}

#[test]
fn catalog_order_wins_over_position() {
    let parsed = parse_reasoning("<analysis>first</analysis> <reasoning>second</reasoning>");
    assert_eq!(parsed.format, Some(ReasoningFormat::ReasoningTags));
    assert_eq!(parsed.thinking, "second");
    assert_eq!(parsed.content, "<analysis>first</analysis>");
}

#[test]
fn only_first_block_is_extracted() {
    let parsed = parse_reasoning("<think>a</think>mid<think>b</think>end");
    assert_eq!(parsed.thinking, "a");
    assert_eq!(parsed.content, "mid<think>b</think>end");
}

#[test]
fn tilde_fence_block() {
    let parsed = parse_reasoning("Intro\n~~~reasoning\nwork it out\n~~~\nOutro");
    assert_eq!(parsed.format, Some(ReasoningFormat::Fenced));
    assert_eq!(parsed.thinking, "work it out");
    assert_eq!(parsed.content, "Intro\n\nOutro");
}

#[test]
fn header_sections_need_more_than_fifty_chars() {
    let fifty = "x".repeat(50);
    let text = format!("### Thought\n{fifty}\n### Reply\nhi");
    assert_eq!(parse_reasoning(&text).format, None);

    let fifty_one = "x".repeat(51);
    let text = format!("### Thought\n{fifty_one}\n### Reply\nhi");
    let parsed = parse_reasoning(&text);
    assert_eq!(parsed.format, Some(ReasoningFormat::Header));
    assert_eq!(parsed.thinking, fifty_one);
    assert_eq!(parsed.content, "### Reply\nhi");
}

#[test]
fn header_threshold_counts_characters_not_bytes() {
    // 30 characters, 90 bytes
    let body = "考".repeat(30);
    let text = format!("# Thinking\n{body}\n# Done\nok");
    assert_eq!(parse_reasoning(&text).format, None);
}

#[test]
fn worked_example() {
    let parsed =
        parse_reasoning("Let me think. <think>checking the math: 2+2=4</think>The answer is 4.");
    assert_eq!(
        parsed,
        ParsedReasoning {
            thinking: "checking the math: 2+2=4".to_string(),
            content: "Let me think. The answer is 4.".to_string(),
            has_thinking: true,
            format: Some(ReasoningFormat::ThinkTags),
        }
    );
}
