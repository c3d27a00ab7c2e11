use crate::core::tool_call::ToolInvocation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Why a model reply could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyFailure {
    /// Neither strict JSON nor the literal fallback could decode the text
    Undecodable,
    /// Decoded, but carried neither a usable `response` nor a `tools` mapping
    UnexpectedShape,
    /// The final round asked for tools instead of answering
    MissingResponse,
    /// The endpoint returned no text at all
    EmptyCompletion,
}

impl ReplyFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyFailure::Undecodable => "undecodable",
            ReplyFailure::UnexpectedShape => "unexpected_shape",
            ReplyFailure::MissingResponse => "missing_response",
            ReplyFailure::EmptyCompletion => "empty_completion",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ReplyFailure::Undecodable => "Failed to decode response as JSON",
            ReplyFailure::UnexpectedShape => "Response has neither a `response` nor a `tools` field",
            ReplyFailure::MissingResponse => "Final reply did not contain a `response` field",
            ReplyFailure::EmptyCompletion => "No valid response from model",
        }
    }
}

impl fmt::Display for ReplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reply the loop gave up on, with the text that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyError {
    pub tag: ReplyFailure,
    pub content: String,
}

impl ReplyError {
    pub fn new(tag: ReplyFailure, content: impl Into<String>) -> Self {
        Self {
            tag,
            content: content.into(),
        }
    }

    /// `{"error": ..., "tag": ..., "content": ...}`
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "error": self.tag.message(),
            "tag": self.tag.as_str(),
            "content": self.content
        })
    }
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.tag.message(), self.tag)
    }
}

/// A decoded model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// Tools to run, in the order the model listed them
    Tools(Vec<ToolInvocation>),
    /// The model answered directly
    Response(String),
    Failed(ReplyError),
}
