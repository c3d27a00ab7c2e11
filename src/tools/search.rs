use super::{serpapi::SerpApiClient, tool::ToolFuture, Tool};
use crate::{
    schemas::{decode_arguments, params_schema},
    AgentError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_RESULT_COUNT: u32 = 5;
const MAX_RESULT_COUNT: u32 = 20;

/// Parameters for web searches
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WebSearchParams {
    /// What to search for
    pub query: String,
    /// Number of results to return
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// Google results through SerpApi, flattened to one line each
#[derive(Debug, Clone)]
pub struct WebSearchTool {
    serpapi: SerpApiClient,
    default_count: u32,
}

impl WebSearchTool {
    pub fn new(serpapi: SerpApiClient) -> Self {
        Self {
            serpapi,
            default_count: DEFAULT_RESULT_COUNT,
        }
    }

    pub fn with_default_count(mut self, count: u32) -> Self {
        self.default_count = count.clamp(1, MAX_RESULT_COUNT);
        self
    }

    async fn search(&self, query: &str, count: u32) -> Result<Vec<String>, AgentError> {
        let body = self
            .serpapi
            .search("google", &[("q", query.to_string()), ("num", count.to_string())])
            .await?;

        let organic = match body.get("organic_results") {
            Some(results) => Vec::<OrganicResult>::deserialize(results).map_err(|err| {
                AgentError::ToolExecution(format!("Unexpected search payload: {}", err))
            })?,
            None => Vec::new(),
        };

        Ok(organic
            .into_iter()
            .take(count as usize)
            .map(format_result)
            .collect())
    }
}

fn format_result(result: OrganicResult) -> String {
    match result.snippet.filter(|snippet| !snippet.trim().is_empty()) {
        Some(snippet) => format!("{}: {} ({})", result.title, snippet.trim(), result.link),
        None => format!("{} ({})", result.title, result.link),
    }
}

impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Searches the web and returns the top results as short text summaries. Use it for current events or facts you do not know."
    }

    fn return_format(&self) -> &'static str {
        "Optional[List[str]]: One 'title: snippet (link)' line per result, or None if the search failed"
    }

    fn parameters_schema(&self) -> Value {
        params_schema::<WebSearchParams>()
    }

    fn execute(&self, parameters: Value) -> ToolFuture<'_> {
        Box::pin(async move {
            let params: WebSearchParams = decode_arguments(self.name(), parameters)?;
            let query = params.query.trim();
            if query.is_empty() {
                return Err(AgentError::ToolExecution(
                    "web_search requires a non-empty query".to_string(),
                ));
            }

            let count = params
                .count
                .unwrap_or(self.default_count)
                .clamp(1, MAX_RESULT_COUNT);
            let results = self.search(query, count).await?;
            Ok(Value::from(results))
        })
    }
}
