use crate::{tools::ToolResult, types::ReplyFailure};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single step in answering one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    /// The question as the user asked it
    Query { content: String },
    /// Raw text the model sent back in a given round
    ModelReply { round: usize, raw: String },
    /// A tool about to run
    Action { tool_name: String, arguments: Value },
    /// The result of a tool run
    Observation {
        tool_name: String,
        result: ToolResult,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    /// A requested tool that is not registered
    Skipped { tool_name: String, reason: String },
    /// Final answer from the model
    FinalAnswer { answer: String },
    /// The run ended on an unusable reply
    Failure { tag: ReplyFailure, content: String },
}

impl AgentStep {
    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Query { content } => format!("🧭 Question: {}", content),
            AgentStep::ModelReply { round, raw } => format!("💬 Reply (round {}): {}", round, raw),
            AgentStep::Action {
                tool_name,
                arguments,
            } => format!("🔧 Action: {}({})", tool_name, arguments),
            AgentStep::Observation {
                tool_name, result, ..
            } => match result {
                ToolResult::Value(value) => format!("👁 Observation from {}: {}", tool_name, value),
                ToolResult::Absent => format!("❌ No result from {}", tool_name),
            },
            AgentStep::Skipped { tool_name, reason } => {
                format!("⚠ Skipped {}: {}", tool_name, reason)
            }
            AgentStep::FinalAnswer { answer } => format!("✅ Final Answer: {}", answer),
            AgentStep::Failure { tag, content } => format!("❌ Failed ({}): {}", tag, content),
        }
    }
}
