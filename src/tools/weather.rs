use super::{tool::ToolFuture, Tool, DEFAULT_TOOL_TIMEOUT};
use crate::{
    schemas::{decode_arguments, params_schema},
    AgentError,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Parameters for weather queries
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WeatherParams {
    /// City name only, e.g. "London"
    pub location: String,
}

/// Current conditions as handed back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature: String,
    pub description: String,
    pub humidity: String,
    pub wind_speed: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    main: OpenWeatherMain,
    weather: Vec<OpenWeatherCondition>,
    wind: OpenWeatherWind,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: Number,
    humidity: Number,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherWind {
    speed: Number,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherError {
    message: String,
}

impl From<OpenWeatherResponse> for WeatherReport {
    fn from(response: OpenWeatherResponse) -> Self {
        let description = response
            .weather
            .into_iter()
            .next()
            .map(|condition| condition.description)
            .unwrap_or_default();

        Self {
            temperature: format!("{}°C", response.main.temp),
            description,
            humidity: format!("{}%", response.main.humidity),
            wind_speed: format!("{} m/s", response.wind.speed),
        }
    }
}

/// Current weather from OpenWeatherMap, metric units
#[derive(Debug, Clone)]
pub struct WeatherTool {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl WeatherTool {
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

    async fn fetch(&self, location: &str) -> Result<WeatherReport, AgentError> {
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                AgentError::ToolExecution(format!("Failed to call weather API: {}", err))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            AgentError::ToolExecution(format!("Failed to read weather response: {}", err))
        })?;

        if status != StatusCode::OK {
            let message = serde_json::from_str::<OpenWeatherError>(&body)
                .map(|error| error.message)
                .unwrap_or(body);
            return Err(AgentError::ToolExecution(format!(
                "Weather API returned {}: {}",
                status, message
            )));
        }

        let parsed: OpenWeatherResponse = serde_json::from_str(&body).map_err(|err| {
            AgentError::ToolExecution(format!("Unexpected weather payload: {}", err))
        })?;

        Ok(parsed.into())
    }
}

impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        "get_current_weather"
    }

    fn description(&self) -> &'static str {
        "Returns the current weather in a specific location. Location must be provided as a string, only the city name"
    }

    fn return_format(&self) -> &'static str {
        "Optional[Dict[str, str]]: Dictionary containing weather information (temperature, description, humidity, wind_speed), or None if weather data is not available"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        params_schema::<WeatherParams>()
    }

    fn execute(&self, parameters: serde_json::Value) -> ToolFuture<'_> {
        Box::pin(async move {
            let params: WeatherParams = decode_arguments(self.name(), parameters)?;
            let report = self.fetch(params.location.trim()).await?;

            serde_json::to_value(report).map_err(|e| {
                AgentError::ToolExecution(format!("Failed to serialize result: {}", e))
            })
        })
    }
}
