use crate::tools::ToolResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the agent learned while working on one question.
///
/// Handed to the model as text on the follow-up request. Tool names and
/// results are positionally aligned; absent results render as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    question: String,
    tools_used: Vec<String>,
    outputs: Vec<ToolResult>,
}

impl Context {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            tools_used: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Record one finished invocation
    pub fn record(&mut self, tool_name: impl Into<String>, result: ToolResult) {
        self.tools_used.push(tool_name.into());
        self.outputs.push(result);
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn tools_used(&self) -> &[String] {
        &self.tools_used
    }

    pub fn outputs(&self) -> &[ToolResult] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.tools_used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools_used.is_empty()
    }

    /// Text form embedded in the next prompt
    pub fn render(&self) -> String {
        let tools = serde_json::to_string(&self.tools_used).unwrap_or_default();
        let outputs = serde_json::to_string(&self.outputs).unwrap_or_default();
        format!(
            "You are trying to answer this question: {}\nYou used the following tools: {}\n\nYou got the following outputs from the tools: {}",
            self.question, tools, outputs
        )
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_empty() {
        let context = Context::new("What now?");
        assert!(context.is_empty());
        let text = context.render();
        assert!(text.contains("What now?"));
        assert!(text.contains("You used the following tools: []"));
        assert!(text.contains("outputs from the tools: []"));
    }

    #[test]
    fn test_render_with_absent_result() {
        let mut context = Context::new("Weather and video?");
        context.record(
            "get_current_weather",
            ToolResult::Value(json!({"temperature": "12°C"})),
        );
        context.record("get_youtube_transcript", ToolResult::Absent);

        assert_eq!(context.len(), 2);
        let text = context.to_string();
        assert!(text.contains(r#"["get_current_weather","get_youtube_transcript"]"#));
        assert!(text.contains(r#"[{"temperature":"12°C"},null]"#));
    }
}
