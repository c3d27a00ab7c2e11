use super::DEFAULT_TOOL_TIMEOUT;
use crate::AgentError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// Minimal SerpApi client shared by the search-backed tools
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl SerpApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TOOL_TIMEOUT,
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one search against `engine` and return the raw JSON body
    pub async fn search(&self, engine: &str, params: &[(&str, String)]) -> Result<Value, AgentError> {
        let url = format!("{}/search.json", self.base_url.trim_end_matches('/'));

        let mut query: Vec<(&str, &str)> = vec![("engine", engine)];
        query.extend(params.iter().map(|(key, value)| (*key, value.as_str())));
        query.push(("api_key", self.api_key.as_str()));

        let response = self
            .client
            .get(&url)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| AgentError::ToolExecution(format!("Failed to call SerpApi: {}", err)))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|err| {
            AgentError::ToolExecution(format!("Failed to read SerpApi response: {}", err))
        })?;

        if let Some(message) = body.get("error").and_then(Value::as_str) {
            return Err(AgentError::ToolExecution(format!("SerpApi error: {}", message)));
        }
        if !status.is_success() {
            return Err(AgentError::ToolExecution(format!(
                "SerpApi returned status {}",
                status
            )));
        }

        Ok(body)
    }
}
