use super::literal::parse_literal;
use crate::{
    core::tool_call::ToolInvocation,
    types::{ModelReply, ReplyError, ReplyFailure},
};
use serde_json::Value;
use tracing::debug;

/// Remove Markdown code fences (```` ```json ```` or bare ```` ``` ````) around a reply
pub(crate) fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);

    // Drop a language label such as `json` or `python` before the body
    let body = match rest.find(|c: char| c == '\n' || c == '{' || c == '[') {
        Some(idx) if rest[..idx].trim().chars().all(|c| c.is_ascii_alphanumeric()) => &rest[idx..],
        _ => rest,
    };
    body.trim()
}

/// Strict JSON first, then the literal-expression fallback
pub(crate) fn decode_value(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Some(value),
        Err(json_err) => match parse_literal(text) {
            Ok(value) => {
                debug!(target: "prompt_agent::reply", error = %json_err, "reply decoded through literal fallback");
                Some(value)
            }
            Err(literal_err) => {
                debug!(
                    target: "prompt_agent::reply",
                    json_error = %json_err,
                    literal_error = %literal_err,
                    "reply is not decodable"
                );
                None
            }
        },
    }
}

/// Decode the raw text of a model reply
pub fn decode_reply(raw: &str) -> ModelReply {
    let cleaned = strip_code_fences(raw);
    match decode_value(cleaned) {
        Some(value) => interpret(value, raw),
        None => ModelReply::Failed(ReplyError::new(ReplyFailure::Undecodable, raw)),
    }
}

fn interpret(value: Value, raw: &str) -> ModelReply {
    let Value::Object(mut fields) = value else {
        return ModelReply::Failed(ReplyError::new(ReplyFailure::UnexpectedShape, raw));
    };

    match fields.remove("response") {
        Some(Value::Null) | None => {}
        Some(Value::String(text)) => return ModelReply::Response(text),
        Some(other) => return ModelReply::Response(other.to_string()),
    }

    match fields.remove("tools") {
        Some(Value::Object(tools)) => ModelReply::Tools(
            tools
                .into_iter()
                .map(|(name, arguments)| ToolInvocation::new(name, arguments))
                .collect(),
        ),
        _ => ModelReply::Failed(ReplyError::new(ReplyFailure::UnexpectedShape, raw)),
    }
}
