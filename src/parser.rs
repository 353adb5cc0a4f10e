use serde_json::Value;

/// How a reply should be interpreted, fixed per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// The action's contract is a JSON object.
    Structured,
    /// The reply is free text, passed through after cleanup.
    Passthrough,
}

/// Terminal state of one parse. Exactly one per invocation, no retries here.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    Structured(Value),
    Text(String),
    /// The reply was not valid JSON even after brace extraction. Absorbed into a
    /// renderable message instead of an error.
    Degraded { message: String },
}

pub const DEGRADED_MESSAGE: &str =
    "The AI reply could not be interpreted. Please try the request again.";

/// Parse a raw LLM reply.
///
/// Structured mode: strict parse first, then first-`{`-to-last-`}` extraction,
/// then the degraded fallback. The extraction is not nested-depth aware; a reply
/// carrying several JSON fragments can mis-extract and land in the degraded
/// path, which is the accepted behavior.
pub fn parse_reply(raw: &str, mode: ParseMode) -> ParsedReply {
    match mode {
        ParseMode::Passthrough => ParsedReply::Text(strip_fences(raw)),
        ParseMode::Structured => {
            let trimmed = raw.trim();
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                if value.is_object() {
                    return ParsedReply::Structured(value);
                }
            }

            if let Some(candidate) = extract_braced(trimmed) {
                if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                    if value.is_object() {
                        tracing::warn!("LLM reply carried prose around the JSON object");
                        return ParsedReply::Structured(value);
                    }
                }
            }

            tracing::warn!("LLM reply was not parseable JSON - returning degraded result");
            ParsedReply::Degraded {
                message: DEGRADED_MESSAGE.to_string(),
            }
        }
    }
}

/// Slice between the first `{` and the last `}`.
fn extract_braced(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Remove markdown code-fence lines and trim. Fence language tags (```json)
/// are dropped with the fence.
fn strip_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_json_parses_directly() {
        let reply = parse_reply(r#"{"score": 85, "feedback": "ok"}"#, ParseMode::Structured);
        assert_eq!(
            reply,
            ParsedReply::Structured(json!({"score": 85, "feedback": "ok"}))
        );
    }

    #[test]
    fn prose_wrapped_json_is_recovered() {
        let raw = r#"Sure! {"related":[{"id":"42","reason":"same domain"}]} Hope that helps!"#;
        let reply = parse_reply(raw, ParseMode::Structured);
        assert_eq!(
            reply,
            ParsedReply::Structured(json!({"related":[{"id":"42","reason":"same domain"}]}))
        );
    }

    #[test]
    fn fenced_json_is_recovered_by_brace_extraction() {
        let raw = "```json\n{\"summary\": \"s\"}\n```";
        let reply = parse_reply(raw, ParseMode::Structured);
        assert_eq!(reply, ParsedReply::Structured(json!({"summary": "s"})));
    }

    #[test]
    fn embedded_object_round_trips_regardless_of_surrounding_prose() {
        let object = json!({"matches": [{"id": "a", "reason": "r"}], "summary": "two words"});
        let raw = format!("Of course, here you go:\n{object}\nLet me know if you need more.");
        match parse_reply(&raw, ParseMode::Structured) {
            ParsedReply::Structured(value) => assert_eq!(value, object),
            other => panic!("expected structured, got {other:?}"),
        }
    }

    #[test]
    fn garbage_falls_back_to_degraded_without_panicking() {
        for raw in ["", "no braces here", "{broken", "}{", "42", "[1,2,3]"] {
            let reply = parse_reply(raw, ParseMode::Structured);
            assert!(
                matches!(reply, ParsedReply::Degraded { ref message } if message == DEGRADED_MESSAGE),
                "input {raw:?} produced {reply:?}"
            );
        }
    }

    #[test]
    fn multi_object_reply_lands_in_degraded_path() {
        // First-{ to last-} spans both objects and fails to parse. Documented
        // limitation of the non-depth-aware extraction.
        let raw = r#"{"a": 1} and also {"b": 2}"#;
        let reply = parse_reply(raw, ParseMode::Structured);
        assert!(matches!(reply, ParsedReply::Degraded { .. }));
    }

    #[test]
    fn passthrough_trims_and_strips_fences() {
        let raw = "```\nA plain answer.\nSecond line.\n```\n";
        let reply = parse_reply(raw, ParseMode::Passthrough);
        assert_eq!(
            reply,
            ParsedReply::Text("A plain answer.\nSecond line.".to_string())
        );
    }

    #[test]
    fn passthrough_keeps_ordinary_text_intact() {
        let reply = parse_reply("  just text  ", ParseMode::Passthrough);
        assert_eq!(reply, ParsedReply::Text("just text".to_string()));
    }
}
