use crate::{AgentError, Result};
use jsonschema::{Draft, JSONSchema};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

const MAX_SCHEMA_ERRORS: usize = 3;

/// How tool arguments are checked before a tool runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArgumentValidator {
    /// Tools decode their own typed parameters; nothing is checked up front
    #[default]
    SerdeFirst,
    /// Arguments must satisfy the tool's JSON Schema before it is invoked
    Strict,
}

impl ArgumentValidator {
    /// Check `arguments` against a tool's parameter schema
    pub fn check(&self, tool_name: &str, schema: &Value, arguments: &Value) -> Result<()> {
        match self {
            ArgumentValidator::SerdeFirst => Ok(()),
            ArgumentValidator::Strict => strict_check(tool_name, schema, arguments),
        }
    }
}

fn strict_check(tool_name: &str, schema: &Value, arguments: &Value) -> Result<()> {
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|err| {
            AgentError::Validation(format!(
                "Failed to prepare parameter schema for `{}`: {}",
                tool_name, err
            ))
        })?;

    if let Err(errors) = compiled.validate(arguments) {
        let mut details = Vec::new();
        let mut truncated = false;

        for (idx, error) in errors.enumerate() {
            if idx == MAX_SCHEMA_ERRORS {
                truncated = true;
                break;
            }
            let mut path = error.instance_path.to_string();
            if path.is_empty() {
                path = "<root>".to_string();
            }
            details.push(format!("{}: {}", path, error));
        }

        let mut detail_str = details.join("; ");
        if truncated {
            detail_str.push_str("; additional errors truncated");
        }

        return Err(AgentError::Validation(format!(
            "Arguments for `{}` do not match its schema: {}",
            tool_name, detail_str
        )));
    }

    Ok(())
}

/// Decode tool arguments into typed parameters, reporting the failing path
pub fn decode_arguments<T: DeserializeOwned>(tool_name: &str, arguments: Value) -> Result<T> {
    serde_path_to_error::deserialize(arguments).map_err(|e| {
        let path = e.path().to_string();
        let location = if path == "." { "<root>".to_string() } else { path };
        AgentError::ToolExecution(format!(
            "Invalid arguments for `{}` at {}: {}",
            tool_name,
            location,
            e.inner()
        ))
    })
}

/// JSON Schema for a parameter struct
pub fn params_schema<T: JsonSchema>() -> Value {
    let root = schemars::schema_for!(T);
    serde_json::to_value(root).unwrap_or_else(|_| {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct LookupParams {
        location: String,
        #[serde(default)]
        limit: Option<u32>,
    }

    #[test]
    fn test_serde_first_accepts_anything() {
        let schema = params_schema::<LookupParams>();
        assert!(ArgumentValidator::SerdeFirst
            .check("lookup", &schema, &json!("Paris"))
            .is_ok());
    }

    #[test]
    fn test_strict_rejects_missing_required() {
        let schema = params_schema::<LookupParams>();
        let err = ArgumentValidator::Strict
            .check("lookup", &schema, &json!({"limit": 3}))
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("lookup"));
    }

    #[test]
    fn test_strict_accepts_valid_arguments() {
        let schema = params_schema::<LookupParams>();
        assert!(ArgumentValidator::Strict
            .check("lookup", &schema, &json!({"location": "Paris", "limit": 2}))
            .is_ok());
    }

    #[test]
    fn test_decode_reports_path() {
        let err =
            decode_arguments::<LookupParams>("lookup", json!({"location": 12})).unwrap_err();
        assert!(err.to_string().contains("location"));
    }
}
