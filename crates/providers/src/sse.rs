//! Wire decoding for OpenAI Responses-API SSE payloads.
//!
//! Each SSE `data:` line carries a JSON object tagged by `type`. Only
//! the event types the pipeline cares about are decoded; everything
//! else, including malformed JSON and objects missing expected
//! fields, maps to [`SseLine::Skip`] rather than an error.

use tracing::{trace, warn};

use crate::event::{CompletionUsage, ItemCompletion, ItemKind, ProviderEvent};

/// Result of decoding a single SSE data line.
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Nothing actionable (unknown tag, malformed payload, `[DONE]`).
    Skip,
    /// A decoded provider event.
    Event(ProviderEvent),
}

/// Decode one SSE `data:` payload into a provider event.
pub fn decode_sse_data(data: &str) -> SseLine {
    if data == "[DONE]" {
        return SseLine::Skip;
    }

    let Ok(evt) = serde_json::from_str::<serde_json::Value>(data) else {
        trace!(len = data.len(), "skipping non-JSON SSE data line");
        return SseLine::Skip;
    };

    let event = match evt["type"].as_str().unwrap_or("") {
        "response.output_text.delta" => {
            evt["delta"].as_str().map(|d| ProviderEvent::OutputDelta(d.to_string()))
        },
        "response.output_text.done" => {
            evt["text"].as_str().map(|t| ProviderEvent::OutputDone(t.to_string()))
        },
        "response.refusal.delta" => {
            evt["delta"].as_str().map(|d| ProviderEvent::RefusalDelta(d.to_string()))
        },
        "response.refusal.done" => {
            evt["refusal"].as_str().map(|t| ProviderEvent::RefusalDone(t.to_string()))
        },
        "response.output_item.added" => decode_item_added(&evt),
        "response.output_item.done" => decode_item_done(&evt),
        "response.reasoning_summary_text.delta" => {
            match (output_index(&evt), evt["delta"].as_str()) {
                (Some(slot), Some(text)) => Some(ProviderEvent::ReasoningDelta {
                    slot,
                    text: text.to_string(),
                }),
                _ => None,
            }
        },
        "response.reasoning_summary_text.done" => {
            match (output_index(&evt), evt["text"].as_str()) {
                (Some(slot), Some(text)) => Some(ProviderEvent::ReasoningDone {
                    slot,
                    text: text.to_string(),
                }),
                _ => None,
            }
        },
        "response.code_interpreter_call_code.delta" => {
            match (output_index(&evt), evt["delta"].as_str()) {
                (Some(slot), Some(code)) => Some(ProviderEvent::CodeDelta {
                    slot,
                    code: code.to_string(),
                }),
                _ => None,
            }
        },
        "response.code_interpreter_call_code.done" => {
            match (output_index(&evt), evt["code"].as_str()) {
                (Some(slot), Some(code)) => Some(ProviderEvent::CodeDone {
                    slot,
                    code: code.to_string(),
                }),
                _ => None,
            }
        },
        "response.completed" => Some(ProviderEvent::Completed(decode_usage(&evt["response"]))),
        "error" | "response.failed" => {
            let message = evt["error"]["message"]
                .as_str()
                .or_else(|| evt["message"].as_str())
                .unwrap_or("unknown error");
            warn!(message, "provider reported a stream error");
            None
        },
        other => {
            trace!(event_type = other, "ignoring unknown SSE event type");
            None
        },
    };

    event.map_or(SseLine::Skip, SseLine::Event)
}

fn output_index(evt: &serde_json::Value) -> Option<usize> {
    evt["output_index"].as_u64().map(|v| v as usize)
}

fn item_kind(item: &serde_json::Value) -> Option<ItemKind> {
    match item["type"].as_str()? {
        "reasoning" => Some(ItemKind::Reasoning),
        "web_search_call" => Some(ItemKind::WebSearch),
        "code_interpreter_call" => Some(ItemKind::CodeExecution),
        _ => None,
    }
}

fn decode_item_added(evt: &serde_json::Value) -> Option<ProviderEvent> {
    let slot = output_index(evt)?;
    let kind = item_kind(&evt["item"])?;
    Some(ProviderEvent::ItemAdded { slot, kind })
}

fn decode_item_done(evt: &serde_json::Value) -> Option<ProviderEvent> {
    let slot = output_index(evt)?;
    let item = &evt["item"];
    let done = match item_kind(item)? {
        ItemKind::Reasoning => ItemCompletion::Reasoning,
        ItemKind::WebSearch => ItemCompletion::WebSearch {
            query: item["action"]["query"].as_str().unwrap_or("").to_string(),
        },
        ItemKind::CodeExecution => ItemCompletion::CodeExecution {
            logs: item["outputs"]
                .as_array()
                .map(|outputs| {
                    outputs
                        .iter()
                        .filter(|out| out["type"].as_str() == Some("logs"))
                        .filter_map(|out| out["logs"].as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        },
    };
    Some(ProviderEvent::ItemDone { slot, done })
}

fn decode_usage(response: &serde_json::Value) -> CompletionUsage {
    let usage = &response["usage"];
    let web_search_enabled = response["tools"]
        .as_array()
        .is_some_and(|tools| {
            tools.iter().any(|tool| {
                tool["type"]
                    .as_str()
                    .is_some_and(|t| t.starts_with("web_search"))
            })
        });
    CompletionUsage {
        model_id: response["model"].as_str().unwrap_or("").to_string(),
        web_search_enabled,
        input_tokens: usage["input_tokens"].as_u64().unwrap_or(0),
        cached_input_tokens: usage["input_tokens_details"]["cached_tokens"]
            .as_u64()
            .unwrap_or(0),
        output_tokens: usage["output_tokens"].as_u64().unwrap_or(0),
        reasoning_tokens: usage["output_tokens_details"]["reasoning_tokens"]
            .as_u64()
            .unwrap_or(0),
        total_tokens: usage["total_tokens"].as_u64().unwrap_or(0),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_text_delta() {
        let line = r#"{"type":"response.output_text.delta","delta":"Hel"}"#;
        assert_eq!(
            decode_sse_data(line),
            SseLine::Event(ProviderEvent::OutputDelta("Hel".into()))
        );
    }

    #[test]
    fn output_text_done() {
        let line = r#"{"type":"response.output_text.done","text":"Hello"}"#;
        assert_eq!(
            decode_sse_data(line),
            SseLine::Event(ProviderEvent::OutputDone("Hello".into()))
        );
    }

    #[test]
    fn reasoning_item_added() {
        let line = r#"{"type":"response.output_item.added","output_index":1,"item":{"type":"reasoning"}}"#;
        assert_eq!(
            decode_sse_data(line),
            SseLine::Event(ProviderEvent::ItemAdded {
                slot: 1,
                kind: ItemKind::Reasoning
            })
        );
    }

    #[test]
    fn web_search_item_done_carries_query() {
        let line = r#"{"type":"response.output_item.done","output_index":0,"item":{"type":"web_search_call","action":{"type":"search","query":"rust"}}}"#;
        assert_eq!(
            decode_sse_data(line),
            SseLine::Event(ProviderEvent::ItemDone {
                slot: 0,
                done: ItemCompletion::WebSearch {
                    query: "rust".into()
                }
            })
        );
    }

    #[test]
    fn code_item_done_collects_log_outputs() {
        let line = r#"{"type":"response.output_item.done","output_index":2,"item":{"type":"code_interpreter_call","outputs":[{"type":"logs","logs":"4"},{"type":"image","url":"u"},{"type":"logs","logs":"ok"}]}}"#;
        assert_eq!(
            decode_sse_data(line),
            SseLine::Event(ProviderEvent::ItemDone {
                slot: 2,
                done: ItemCompletion::CodeExecution {
                    logs: vec!["4".into(), "ok".into()]
                }
            })
        );
    }

    #[test]
    fn completed_decodes_usage_and_web_search_flag() {
        let line = r#"{"type":"response.completed","response":{"model":"gpt-5","tools":[{"type":"web_search_preview"}],"usage":{"input_tokens":100,"input_tokens_details":{"cached_tokens":25},"output_tokens":40,"output_tokens_details":{"reasoning_tokens":15},"total_tokens":140}}}"#;
        let SseLine::Event(ProviderEvent::Completed(usage)) = decode_sse_data(line) else {
            panic!("expected completion event");
        };
        assert_eq!(usage.model_id, "gpt-5");
        assert!(usage.web_search_enabled);
        assert_eq!(usage.input_tokens, 100);
        assert_eq!(usage.cached_input_tokens, 25);
        assert_eq!(usage.output_tokens, 40);
        assert_eq!(usage.reasoning_tokens, 15);
        assert_eq!(usage.total_tokens, 140);
    }

    #[test]
    fn unknown_function_call_item_is_skipped() {
        let line = r#"{"type":"response.output_item.added","output_index":0,"item":{"type":"function_call","name":"f"}}"#;
        assert_eq!(decode_sse_data(line), SseLine::Skip);
    }

    #[test]
    fn missing_fields_are_skipped_not_errors() {
        assert_eq!(
            decode_sse_data(r#"{"type":"response.output_text.delta"}"#),
            SseLine::Skip
        );
        assert_eq!(decode_sse_data("not json"), SseLine::Skip);
        assert_eq!(decode_sse_data("[DONE]"), SseLine::Skip);
    }

    #[test]
    fn provider_error_is_skipped() {
        let line = r#"{"type":"error","error":{"message":"boom"}}"#;
        assert_eq!(decode_sse_data(line), SseLine::Skip);
    }
}
