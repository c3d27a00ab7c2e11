use super::reply::ReplyError;
use crate::core::{context::Context, steps::AgentStep};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Answer {
    /// Natural-language answer from the model
    Final { text: String },
    /// The model's reply could not be used
    Failed { error: ReplyError },
}

/// Result of answering one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub answer: Answer,
    /// Context built from this run's tool calls; `None` when the model answered straight away
    pub context: Option<Context>,
    /// All steps taken during the run
    pub steps: Vec<AgentStep>,
    /// Total tokens used across rounds (if available from the API)
    pub tokens: Option<TokenUsage>,
    /// Total execution duration
    pub duration: Duration,
    /// Number of model requests issued
    pub rounds: usize,
}

/// Token usage information from the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn add(&mut self, other: TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

impl RunResult {
    /// The answer text, or the failure payload rendered as JSON
    pub fn output(&self) -> String {
        match &self.answer {
            Answer::Final { text } => text.clone(),
            Answer::Failed { error } => error.to_payload().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.answer, Answer::Final { .. })
    }

    pub fn reply_error(&self) -> Option<&ReplyError> {
        match &self.answer {
            Answer::Failed { error } => Some(error),
            Answer::Final { .. } => None,
        }
    }

    /// Number of tools actually invoked
    pub fn action_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Action { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Skipped { .. }))
            .count()
    }

    /// Generate a human-readable replay of the execution
    pub fn replay(&self) -> String {
        let mut lines = self.header("=== Agent Execution Trace ===");

        lines.push(String::new());
        lines.push("--- Steps ---".to_string());
        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }

        lines.push(String::new());
        lines.push("--- Final Output ---".to_string());
        lines.push(self.output());

        lines.join("\n")
    }

    /// Like [`replay`](Self::replay), with the full data of every step
    pub fn explain(&self) -> String {
        let mut lines = self.header("=== Agent Execution Explanation ===");

        lines.push(String::new());
        lines.push("--- Detailed Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("\n{}. {}", idx + 1, step.describe()));

            match step {
                AgentStep::Query { content } => {
                    lines.push(format!("   Content: {}", content));
                }
                AgentStep::ModelReply { round, raw } => {
                    lines.push(format!("   Round: {}", round));
                    lines.push(format!("   Raw: {}", raw));
                }
                AgentStep::Action {
                    tool_name,
                    arguments,
                } => {
                    lines.push(format!("   Tool: {}", tool_name));
                    lines.push(format!("   Arguments: {}", arguments));
                }
                AgentStep::Observation {
                    tool_name,
                    result,
                    duration_ms,
                } => {
                    lines.push(format!("   Tool: {}", tool_name));
                    lines.push(format!("   Absent: {}", result.is_absent()));
                    if let Some(ms) = duration_ms {
                        lines.push(format!("   Duration: {}ms", ms));
                    }
                    lines.push(format!("   Result: {}", result.to_json()));
                }
                AgentStep::Skipped { tool_name, reason } => {
                    lines.push(format!("   Tool: {}", tool_name));
                    lines.push(format!("   Reason: {}", reason));
                }
                AgentStep::FinalAnswer { answer } => {
                    lines.push(format!("   Answer: {}", answer));
                }
                AgentStep::Failure { tag, content } => {
                    lines.push(format!("   Tag: {}", tag));
                    lines.push(format!("   Content: {}", content));
                }
            }
        }

        if let Some(context) = &self.context {
            lines.push(String::new());
            lines.push("--- Context ---".to_string());
            lines.push(context.render());
        }

        lines.push(String::new());
        lines.push("--- Final Output ---".to_string());
        lines.push(self.output());

        lines.join("\n")
    }

    fn header(&self, title: &str) -> Vec<String> {
        let mut lines = vec![
            title.to_string(),
            format!("Duration: {:.2}s", self.duration.as_secs_f64()),
            format!("Rounds: {}", self.rounds),
        ];

        if let Some(tokens) = &self.tokens {
            lines.push(format!(
                "Tokens: {} prompt + {} completion = {} total",
                tokens.prompt_tokens, tokens.completion_tokens, tokens.total_tokens
            ));
        }

        lines
    }
}
