use mockito::Matcher;
use prompt_agent::{
    tools::{
        FlightSearchTool, SerpApiClient, TranscriptTool, WeatherTool, WebSearchTool,
    },
    AgentError, ChatModel, OpenAIClient, Tool, ToolRegistry, ToolResult,
};
use serde_json::json;

fn query(pairs: &[(&str, &str)]) -> Matcher {
    Matcher::AllOf(
        pairs
            .iter()
            .map(|(key, value)| Matcher::UrlEncoded(key.to_string(), value.to_string()))
            .collect(),
    )
}

#[tokio::test]
async fn test_openai_client_sends_single_user_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 500,
            "messages": [{"role": "user", "content": "Hello?"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"response\": \"Hi\"}"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(format!("{}/v1", server.url()));
    let completion = client.complete("Hello?").await.unwrap();

    assert_eq!(completion.content.as_deref(), Some("{\"response\": \"Hi\"}"));
    assert_eq!(completion.usage.unwrap().total_tokens, 16);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_client_errors() {
    let mut server = mockito::Server::new_async().await;
    let _limited = server
        .mock("POST", "/limited/chat/completions")
        .with_status(429)
        .with_header("retry-after", "7")
        .with_body("{}")
        .create_async()
        .await;
    let _broken = server
        .mock("POST", "/broken/chat/completions")
        .with_status(401)
        .with_body(json!({"error": {"message": "Incorrect API key provided"}}).to_string())
        .create_async()
        .await;

    let limited = OpenAIClient::new("sk-test").with_base_url(format!("{}/limited", server.url()));
    let err = limited.complete("Hello?").await.unwrap_err();
    assert!(matches!(err, AgentError::RateLimit { retry_after: 7 }));
    assert!(err.is_retryable());

    let broken = OpenAIClient::new("sk-bad").with_base_url(format!("{}/broken", server.url()));
    let err = broken.complete("Hello?").await.unwrap_err();
    assert!(matches!(err, AgentError::Model(_)));
    assert!(err.to_string().contains("Incorrect API key provided"));
}

#[tokio::test]
async fn test_openai_client_without_choices() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(json!({"choices": []}).to_string())
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(format!("{}/v1", server.url()));
    let completion = client.complete("Hello?").await.unwrap();
    assert!(completion.content.is_none());
}

#[tokio::test]
async fn test_weather_tool_maps_openweather_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/data/2.5/weather")
        .match_query(query(&[("q", "Paris"), ("appid", "w-key"), ("units", "metric")]))
        .with_status(200)
        .with_body(
            json!({
                "main": {"temp": 21.5, "humidity": 40},
                "weather": [{"description": "few clouds"}],
                "wind": {"speed": 3.6}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tool = WeatherTool::new("w-key").with_base_url(server.url());
    let value = tool.execute(json!({"location": " Paris "})).await.unwrap();

    assert_eq!(
        value,
        json!({
            "temperature": "21.5°C",
            "description": "few clouds",
            "humidity": "40%",
            "wind_speed": "3.6 m/s"
        })
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_weather_failure_is_absent_through_registry() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(json!({"cod": "404", "message": "city not found"}).to_string())
        .create_async()
        .await;

    let tool = WeatherTool::new("w-key").with_base_url(server.url());
    let err = tool.execute(json!({"location": "Atlantis"})).await.unwrap_err();
    assert!(err.to_string().contains("city not found"));

    let mut registry = ToolRegistry::new();
    registry.register(tool);
    let result = registry
        .invoke("get_current_weather", json!({"location": "Atlantis"}))
        .await
        .unwrap();
    assert_eq!(result, ToolResult::Absent);
}

#[tokio::test]
async fn test_transcript_tool_fetches_captions() {
    let mut server = mockito::Server::new_async().await;
    let page = format!(
        r#"<html><script>var ytInitialPlayerResponse = {{"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"{base}/api/timedtext?v=yBGlX1CEG14&lang=en","languageCode":"en"}}]}}}}}};</script></html>"#,
        base = server.url()
    );
    let watch = server
        .mock("GET", "/watch")
        .match_query(query(&[("v", "yBGlX1CEG14")]))
        .with_status(200)
        .with_body(page)
        .create_async()
        .await;
    let captions = server
        .mock("GET", "/api/timedtext")
        .match_query(query(&[("v", "yBGlX1CEG14"), ("lang", "en")]))
        .with_status(200)
        .with_body(
            r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="1.5">Hello &amp;amp; welcome</text><text start="1.5" dur="2">to the show</text></transcript>"#,
        )
        .create_async()
        .await;

    let tool = TranscriptTool::new().with_base_url(server.url());
    let value = tool
        .execute(json!({"video_url": "https://www.youtube.com/watch?v=yBGlX1CEG14"}))
        .await
        .unwrap();

    assert_eq!(
        value,
        json!([
            {"text": "Hello & welcome", "start": 0.0, "duration": 1.5},
            {"text": "to the show", "start": 1.5, "duration": 2.0}
        ])
    );
    watch.assert_async().await;
    captions.assert_async().await;
}

#[tokio::test]
async fn test_transcript_without_captions_is_absent() {
    let mut server = mockito::Server::new_async().await;
    let _watch = server
        .mock("GET", "/watch")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>no captions</html>")
        .create_async()
        .await;

    let mut registry = ToolRegistry::new();
    registry.register(TranscriptTool::new().with_base_url(server.url()));

    let result = registry
        .invoke("get_youtube_transcript", json!({"video_url": "https://youtu.be/abc123"}))
        .await
        .unwrap();
    assert!(result.is_absent());
}

#[tokio::test]
async fn test_flight_search_maps_itineraries() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search.json")
        .match_query(query(&[
            ("engine", "google_flights"),
            ("departure_id", "JFK"),
            ("arrival_id", "CDG"),
            ("outbound_date", "2025-06-01"),
            ("type", "2"),
            ("api_key", "serp-key"),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "best_flights": [{
                    "flights": [{
                        "departure_airport": {"name": "John F. Kennedy", "id": "JFK", "time": "2025-06-01 18:30"},
                        "arrival_airport": {"name": "Charles de Gaulle", "id": "CDG", "time": "2025-06-02 07:45"},
                        "airline": "Air France",
                        "flight_number": "AF 9"
                    }],
                    "total_duration": 435,
                    "price": 540
                }],
                "other_flights": [{
                    "flights": [],
                    "price": 100
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tool = FlightSearchTool::new(SerpApiClient::new("serp-key").with_base_url(server.url()));
    let value = tool
        .execute(json!({"destination": "cdg", "date": "2025-06-01"}))
        .await
        .unwrap();

    assert_eq!(
        value,
        json!([{
            "airline": "Air France",
            "flight_number": "AF 9",
            "departure_airport": "JFK",
            "departure_time": "2025-06-01 18:30",
            "arrival_airport": "CDG",
            "arrival_time": "2025-06-02 07:45",
            "stops": 0,
            "duration_minutes": 435,
            "price": 540.0
        }])
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_flight_search_rejects_bad_date_without_calling_upstream() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search.json")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut registry = ToolRegistry::new();
    registry.register(FlightSearchTool::new(
        SerpApiClient::new("serp-key").with_base_url(server.url()),
    ));

    let result = registry
        .invoke(
            "search_flights",
            json!({"destination": "CDG", "date": "June 1st", "origin": "BOS"}),
        )
        .await
        .unwrap();
    assert_eq!(result, ToolResult::Absent);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_web_search_limits_results() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search.json")
        .match_query(query(&[("engine", "google"), ("q", "rust async"), ("num", "2")]))
        .with_status(200)
        .with_body(
            json!({
                "organic_results": [
                    {"title": "Tokio", "link": "https://tokio.rs", "snippet": "An asynchronous runtime"},
                    {"title": "Async Book", "link": "https://rust-lang.github.io/async-book/"},
                    {"title": "Extra", "link": "https://example.com", "snippet": "dropped"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tool = WebSearchTool::new(SerpApiClient::new("serp-key").with_base_url(server.url()));
    let value = tool
        .execute(json!({"query": "rust async", "count": 2}))
        .await
        .unwrap();

    assert_eq!(
        value,
        json!([
            "Tokio: An asynchronous runtime (https://tokio.rs)",
            "Async Book (https://rust-lang.github.io/async-book/)"
        ])
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_serpapi_error_field_is_absent() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"error": "Invalid API key."}).to_string())
        .create_async()
        .await;

    let client = SerpApiClient::new("bad").with_base_url(server.url());
    let err = client
        .search("google", &[("q", "anything".to_string())])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid API key."));

    let mut registry = ToolRegistry::new();
    registry.register(WebSearchTool::new(client));
    let result = registry
        .invoke("web_search", json!({"query": "anything"}))
        .await
        .unwrap();
    assert!(result.is_absent());
}

#[tokio::test]
async fn test_flight_search_caps_itineraries() {
    let itinerary = |number: &str| {
        json!({
            "flights": [{
                "departure_airport": {"id": "BOS", "time": "2025-07-04 09:00"},
                "arrival_airport": {"id": "LHR", "time": "2025-07-04 21:00"},
                "airline": "British Airways",
                "flight_number": number
            }],
            "total_duration": 420,
            "price": 700
        })
    };

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search.json")
        .match_query(query(&[("departure_id", "BOS"), ("currency", "USD")]))
        .with_status(200)
        .with_body(
            json!({
                "best_flights": [itinerary("BA 212")],
                "other_flights": [itinerary("BA 238"), itinerary("BA 202")]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tool = FlightSearchTool::new(SerpApiClient::new("serp-key").with_base_url(server.url()))
        .with_default_origin("bos")
        .with_max_results(2);
    let value = tool
        .execute(json!({"destination": "LHR", "date": "2025-07-04"}))
        .await
        .unwrap();

    let numbers: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["flight_number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["BA 212", "BA 238"]);
}
