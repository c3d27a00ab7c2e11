use crate::{
    error::{AgentError, Result},
    schemas::ArgumentValidator,
    services::openai_client::{
        OpenAIClient, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT,
    },
    tools::{
        flights::{DEFAULT_MAX_RESULTS, DEFAULT_ORIGIN}, search::DEFAULT_RESULT_COUNT, FlightSearchTool, SerpApiClient,
        ToolRegistry, TranscriptTool, WeatherTool, WebSearchTool, DEFAULT_TOOL_TIMEOUT,
    },
};
use std::time::Duration;
use tracing::warn;

/// Everything the agent needs to talk to the model and its tools
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
    /// OpenWeatherMap key; the weather tool is only registered when set
    pub weather_api_key: Option<String>,
    /// SerpApi key; flight and web search are only registered when set
    pub serpapi_api_key: Option<String>,
    pub default_origin: String,
    /// Most itineraries one flight search returns
    pub flight_results: usize,
    pub search_results: u32,
    pub transcript_language: String,
    pub tool_timeout: Duration,
    pub argument_validator: ArgumentValidator,
}

impl AgentConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            timeout: DEFAULT_TIMEOUT,
            weather_api_key: None,
            serpapi_api_key: None,
            default_origin: DEFAULT_ORIGIN.to_string(),
            flight_results: DEFAULT_MAX_RESULTS,
            search_results: DEFAULT_RESULT_COUNT,
            transcript_language: "en".to_string(),
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            argument_validator: ArgumentValidator::default(),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// `OPENAI_API_KEY` is required. Optional: `OPENAI_BASE_URL`,
    /// `OPENAI_MODEL`, `WEATHER_API_KEY` (or `weather_key`),
    /// `SERPAPI_API_KEY`, `FLIGHT_DEFAULT_ORIGIN`.
    pub fn from_env() -> Result<Self> {
        let api_key = non_empty_var("OPENAI_API_KEY").ok_or_else(|| {
            AgentError::Config(
                "OPENAI_API_KEY environment variable must be set before creating an Agent"
                    .to_string(),
            )
        })?;

        Ok(Self::new(api_key).with_env_overrides())
    }

    /// Apply every optional environment variable on top of this configuration
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(base_url) = non_empty_var("OPENAI_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(model) = non_empty_var("OPENAI_MODEL") {
            self.model = model;
        }
        if let Some(key) = non_empty_var("WEATHER_API_KEY").or_else(|| non_empty_var("weather_key")) {
            self.weather_api_key = Some(key);
        }
        if let Some(key) = non_empty_var("SERPAPI_API_KEY") {
            self.serpapi_api_key = Some(key);
        }
        if let Some(origin) = non_empty_var("FLIGHT_DEFAULT_ORIGIN") {
            self.default_origin = origin;
        }
        self
    }

    /// The model client described by this configuration
    pub fn chat_client(&self) -> OpenAIClient {
        OpenAIClient::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_timeout(self.timeout)
    }

    /// Register every tool whose credentials are available
    pub fn build_registry(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new().with_validator(self.argument_validator);

        registry.register(
            TranscriptTool::new()
                .with_language(self.transcript_language.clone())
                .with_timeout(self.tool_timeout),
        );

        match &self.weather_api_key {
            Some(key) => registry.register(WeatherTool::new(key.clone()).with_timeout(self.tool_timeout)),
            None => warn!("WEATHER_API_KEY not set; get_current_weather is unavailable"),
        }

        match &self.serpapi_api_key {
            Some(key) => {
                let serpapi = SerpApiClient::new(key.clone()).with_timeout(self.tool_timeout);
                registry.register(
                    FlightSearchTool::new(serpapi.clone())
                        .with_default_origin(self.default_origin.clone())
                        .with_max_results(self.flight_results),
                );
                registry.register(
                    WebSearchTool::new(serpapi)
                        .with_default_count(self.search_results),
                );
            }
            None => warn!("SERPAPI_API_KEY not set; search_flights and web_search are unavailable"),
        }

        registry
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_without_optional_keys() {
        let config = AgentConfig::new("sk-test");
        let registry = config.build_registry();
        assert_eq!(registry.names(), vec!["get_youtube_transcript"]);
    }

    #[test]
    fn test_registry_with_all_keys() {
        let mut config = AgentConfig::new("sk-test");
        config.weather_api_key = Some("weather".to_string());
        config.serpapi_api_key = Some("serp".to_string());
        config.argument_validator = ArgumentValidator::Strict;

        let registry = config.build_registry();
        assert_eq!(
            registry.names(),
            vec![
                "get_youtube_transcript",
                "get_current_weather",
                "search_flights",
                "web_search"
            ]
        );
        assert_eq!(registry.validator(), ArgumentValidator::Strict);
    }

    #[test]
    fn test_flight_results_default() {
        let config = AgentConfig::new("sk-test");
        assert_eq!(config.flight_results, 5);
        assert_eq!(config.search_results, 5);
    }

    #[test]
    fn test_chat_client_uses_model() {
        let mut config = AgentConfig::new("sk-test");
        config.model = "gpt-4o".to_string();
        assert_eq!(config.chat_client().model(), "gpt-4o");
    }
}
