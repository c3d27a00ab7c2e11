use crate::{
    error::{AgentError, Result},
    schemas::ArgumentValidator,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{future::Future, pin::Pin};
use tracing::{debug, warn};

/// Future returned by [`Tool::execute`]
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// A tool that can be executed by the agent
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// The name the model uses to request this tool
    fn name(&self) -> &'static str;

    /// A description of what the tool does
    fn description(&self) -> &'static str;

    /// Human-readable shape of a successful result
    fn return_format(&self) -> &'static str;

    /// JSON Schema for the tool's parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given parameters
    fn execute(&self, parameters: Value) -> ToolFuture<'_>;
}

/// Outcome of one tool call: a structured value, or nothing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ToolResult {
    Value(Value),
    Absent,
}

impl ToolResult {
    pub fn is_absent(&self) -> bool {
        matches!(self, ToolResult::Absent)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ToolResult::Value(value) => Some(value),
            ToolResult::Absent => None,
        }
    }

    /// JSON form used inside a context; absence is `null`
    pub fn to_json(&self) -> Value {
        self.value().cloned().unwrap_or(Value::Null)
    }
}

impl From<Value> for ToolResult {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ToolResult::Absent,
            other => ToolResult::Value(other),
        }
    }
}

impl From<ToolResult> for Value {
    fn from(result: ToolResult) -> Self {
        match result {
            ToolResult::Value(value) => value,
            ToolResult::Absent => Value::Null,
        }
    }
}

/// Registry of available tools, kept in registration order
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    validator: ArgumentValidator,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(mut self, validator: ArgumentValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn validator(&self) -> ArgumentValidator {
        self.validator
    }

    /// Register a tool, replacing any earlier tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name();
        match self.tools.iter().position(|existing| existing.name() == name) {
            Some(idx) => self.tools[idx] = Box::new(tool),
            None => self.tools.push(Box::new(tool)),
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Render the tool catalogue embedded in prompts
    pub fn describe(&self) -> String {
        if self.tools.is_empty() {
            return "No tools are available.".to_string();
        }

        self.tools
            .iter()
            .enumerate()
            .map(|(idx, tool)| {
                format!(
                    "Tool {}: {}\n\n{}\n\nInput: {}\n\nReturn format: {}",
                    idx + 1,
                    tool.name(),
                    tool.description(),
                    describe_inputs(&tool.parameters_schema()),
                    tool.return_format()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n\n")
    }

    /// Invoke a tool by name.
    ///
    /// Unknown names are an error. Everything that goes wrong inside a known
    /// tool is logged and reported as [`ToolResult::Absent`].
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        if let Err(err) = self
            .validator
            .check(name, &tool.parameters_schema(), &arguments)
        {
            warn!(target: "prompt_agent::tools", tool = name, error = %err, "arguments rejected");
            return Ok(ToolResult::Absent);
        }

        debug!(target: "prompt_agent::tools", tool = name, %arguments, "invoking tool");
        match tool.execute(arguments).await {
            Ok(value) => Ok(ToolResult::from(value)),
            Err(err) => {
                warn!(target: "prompt_agent::tools", tool = name, error = %err, "tool failed");
                Ok(ToolResult::Absent)
            }
        }
    }
}

fn describe_inputs(schema: &Value) -> String {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return "none".to_string();
    };
    if properties.is_empty() {
        return "none".to_string();
    }

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, property)| {
            let kind = short_type_name(property);
            if required.contains(&name.as_str()) {
                format!("{} ({})", name, kind)
            } else {
                format!("{} ({}, optional)", name, kind)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn short_type_name(property: &Value) -> &'static str {
    let json_type = match property.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .find(|kind| *kind != "null")
            .unwrap_or("null"),
        _ => "any",
    };

    match json_type {
        "string" => "str",
        "integer" => "int",
        "number" => "float",
        "boolean" => "bool",
        "array" => "list",
        "object" => "dict",
        _ => "any",
    }
}
