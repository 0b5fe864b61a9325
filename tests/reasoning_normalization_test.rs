//! Integration tests for moving reasoning into `reasoning_content` across
//! the delimiter styles different model families emit.

use reasoning_split::{ReasoningTransformer, Transformer};
use serde_json::{json, Value};

mod common {
    use reasoning_split::Transformer;
    use serde_json::Value;

    pub fn apply_response_transform(transformer: &dyn Transformer, response: Value) -> Value {
        transformer
            .transform_response(response)
            .expect("response transform should succeed")
    }

    pub fn message(response: &Value) -> &Value {
        response
            .get("choices")
            .and_then(|choices| choices.as_array())
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .expect("response should include choices[0].message")
    }
}

fn chat_response(content: &str) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": content
            }
        }]
    })
}

/// DeepSeek R1 / QwQ style `<think>` tags
#[test]
fn test_reasoning_normalization_think_tags() {
    let transformer = ReasoningTransformer::default();
    let transformed = common::apply_response_transform(
        &transformer,
        chat_response("<think>Step 1: analyze</think>The answer is 42"),
    );
    let message = common::message(&transformed);

    assert_eq!(message["content"], "The answer is 42");
    assert_eq!(message["reasoning_content"], "Step 1: analyze");
}

/// Prompted models that wrap reasoning in a fenced block
#[test]
fn test_reasoning_normalization_fenced_block() {
    let transformer = ReasoningTransformer::default();
    let transformed = common::apply_response_transform(
        &transformer,
        chat_response("```thinking\nList the facts.\n```\nThe answer is 42"),
    );
    let message = common::message(&transformed);

    assert_eq!(message["content"], "The answer is 42");
    assert_eq!(message["reasoning_content"], "List the facts.");
}

/// Markdown heading sections from instruction-tuned models
#[test]
fn test_reasoning_normalization_header_section() {
    let transformer = ReasoningTransformer::default();
    let reasoning = "The question asks for a number, so recall the canonical answer and double check it.";
    let transformed = common::apply_response_transform(
        &transformer,
        chat_response(&format!("## Reasoning\n{reasoning}\n\n**Answer:** 42")),
    );
    let message = common::message(&transformed);

    assert_eq!(message["content"], "**Answer:** 42");
    assert_eq!(message["reasoning_content"], reasoning);
}

/// Existing provider reasoning is preserved and extended
#[test]
fn test_reasoning_normalization_preserves_existing_reasoning_content() {
    let transformer = ReasoningTransformer::default();
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "<reasoning>extra</reasoning>The answer is 42",
                "reasoning_content": "Let me think step by step..."
            }
        }]
    });
    let transformed = common::apply_response_transform(&transformer, response);
    let message = common::message(&transformed);

    assert_eq!(message["content"], "The answer is 42");
    assert_eq!(
        message["reasoning_content"],
        "Let me think step by step...\nextra"
    );
}

/// Feed `chunks` as one streamed choice, ending with `finish_reason`, and
/// return the concatenated `(content, reasoning_content)` deltas.
fn stream_deltas(transformer: &ReasoningTransformer, chunks: &[&str]) -> (String, String) {
    let mut content = String::new();
    let mut reasoning = String::new();
    let mut collect = |out: Value| {
        let delta = &out["choices"][0]["delta"];
        content.push_str(delta["content"].as_str().unwrap_or_default());
        reasoning.push_str(delta["reasoning_content"].as_str().unwrap_or_default());
    };

    for chunk in chunks {
        collect(common::apply_response_transform(
            transformer,
            json!({"choices": [{"index": 0, "delta": {"content": chunk}, "finish_reason": null}]}),
        ));
    }
    collect(common::apply_response_transform(
        transformer,
        json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]}),
    ));
    (content, reasoning)
}

fn assert_stream_matches_message(chunks: &[&str]) {
    let transformer = ReasoningTransformer::default();
    let (content, reasoning) = stream_deltas(&transformer, chunks);
    assert_eq!(transformer.active_streams(), 0);

    let text = chunks.concat();
    let batch = common::apply_response_transform(&transformer, chat_response(&text));
    let message = common::message(&batch);
    assert_eq!(content, message["content"], "chunks: {chunks:?}");
    assert_eq!(
        reasoning,
        message["reasoning_content"].as_str().unwrap_or_default(),
        "chunks: {chunks:?}"
    );
}

/// Streaming deltas concatenate to the same split as the complete message
#[test]
fn test_reasoning_normalization_streaming_matches_batch() {
    let text = "Sure. <thinking>compare the two numbers</thinking> The larger is 9.";
    let chars: Vec<char> = text.chars().collect();
    let pieces: Vec<String> = chars.chunks(3).map(|piece| piece.iter().collect()).collect();
    let chunks: Vec<&str> = pieces.iter().map(String::as_str).collect();
    assert_stream_matches_message(&chunks);
}

/// Models that emit a newline before `<think>` must not lose the answer
#[test]
fn test_reasoning_normalization_streaming_whitespace_before_think() {
    let transformer = ReasoningTransformer::default();
    let (content, reasoning) = stream_deltas(
        &transformer,
        &["\n", "<think>", "plan", "</think>", "\n\nThe answer", " is 42."],
    );
    assert_eq!(content, "The answer is 42.");
    assert_eq!(reasoning, "plan");

    assert_stream_matches_message(&["\n", "<think>", "plan", "</think>", "\n\nThe answer", " is 42."]);
}

/// Whitespace-only prefixes and whitespace around the block, split in
/// several places
#[test]
fn test_reasoning_normalization_streaming_whitespace_prefix_matches_batch() {
    assert_stream_matches_message(&["  \n\n", "<thi", "nk>\n step one\n", "</thi", "nk>\n\n", "Done.\n"]);
    assert_stream_matches_message(&[" \n<reasoning>", "a\n\nb", " </reasoning>", "  x  y  "]);
    assert_stream_matches_message(&["\t", " ", "\n", "[Thinking]", "why", "[/Thinking]", " ", "ok"]);
    assert_stream_matches_message(&["\n\n<think>only reasoning</think>\n"]);
}

/// Without any reasoning block the stream passes through untouched
#[test]
fn test_reasoning_normalization_streaming_passthrough_keeps_whitespace() {
    let chunks = ["\n  Hello", " world <", "b>\n"];
    let transformer = ReasoningTransformer::default();
    let (content, reasoning) = stream_deltas(&transformer, &chunks);
    assert_eq!(content, chunks.concat());
    assert_eq!(reasoning, "");
}
