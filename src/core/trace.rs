use super::steps::AgentStep;
use tracing::info;

/// Ordered record of the steps taken for one question
#[derive(Debug, Clone, Default)]
pub struct RunTrace {
    steps: Vec<AgentStep>,
}

impl RunTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step, logging its description
    pub fn add_step(&mut self, step: AgentStep) {
        info!(target: "prompt_agent::steps", "{}", step.describe());
        self.steps.push(step);
    }

    pub fn into_steps(self) -> Vec<AgentStep> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_add_steps() {
        let mut trace = RunTrace::new();
        trace.add_step(AgentStep::Query {
            content: "Test".to_string(),
        });
        trace.add_step(AgentStep::Action {
            tool_name: "web_search".to_string(),
            arguments: Value::Null,
        });
        let steps = trace.into_steps();
        assert_eq!(steps.len(), 2);
        assert!(matches!(steps[0], AgentStep::Query { .. }));
        assert!(matches!(steps.last(), Some(AgentStep::Action { .. })));
    }
}
