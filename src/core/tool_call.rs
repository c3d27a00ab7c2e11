use crate::tools::ToolResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

/// A tool request extracted from a model reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the tool to execute
    pub name: String,
    /// Arguments to pass to the tool, normally an object keyed by input name
    pub arguments: Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// What one invocation produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_name: String,
    pub result: ToolResult,
    /// Execution duration in milliseconds
    pub duration_ms: Option<u64>,
}

impl ToolOutput {
    pub fn new(tool_name: impl Into<String>, result: ToolResult) -> Self {
        Self {
            tool_name: tool_name.into(),
            result,
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

/// Tracks the execution of an invocation with timing information
#[derive(Debug)]
pub struct ToolExecution {
    pub invocation: ToolInvocation,
    start_time: Instant,
}

impl ToolExecution {
    pub fn start(invocation: ToolInvocation) -> Self {
        Self {
            invocation,
            start_time: Instant::now(),
        }
    }

    pub fn complete(self, result: ToolResult) -> ToolOutput {
        ToolOutput::new(self.invocation.name, result).with_duration(self.start_time.elapsed())
    }
}
