// HTTP adapter tests against mocked GitHub, Open-Meteo, OpenWeatherMap and Ollama

use mockito::{Matcher, Server};
use ops_assistant::config::ApiSettings;
use ops_assistant::llm::{OllamaGenerator, PlanGenerator};
use ops_assistant::tools::{GithubTool, Tool, ToolError, WeatherTool};
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;

fn params(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn weather_settings(base: &str, openweather_key: Option<&str>) -> ApiSettings {
    ApiSettings {
        weather_api_base: base.to_string(),
        geocoding_api_base: base.to_string(),
        openweather_api_base: base.to_string(),
        openweather_api_key: openweather_key.map(str::to_string),
        ..ApiSettings::default()
    }
}

fn search_body() -> String {
    json!({
        "total_count": 1234,
        "items": [
            {
                "name": "tokio",
                "full_name": "tokio-rs/tokio",
                "description": "A runtime for writing reliable asynchronous applications",
                "stargazers_count": 26000,
                "forks_count": 2400,
                "language": "Rust",
                "html_url": "https://github.com/tokio-rs/tokio",
                "created_at": "2016-09-09T19:23:33Z",
                "updated_at": "2024-12-01T10:00:00Z",
                "license": {"name": "MIT License"},
                "topics": ["async", "rust"]
            },
            {
                "name": "serde",
                "full_name": "serde-rs/serde",
                "description": null,
                "stargazers_count": 9000,
                "forks_count": 750,
                "language": "Rust",
                "html_url": "https://github.com/serde-rs/serde",
                "created_at": "2014-08-22T00:00:00Z",
                "updated_at": "2024-11-30T00:00:00Z",
                "license": null
            }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn test_github_search_parses_repositories() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search/repositories")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "rust".into()),
            Matcher::UrlEncoded("per_page".into(), "2".into()),
            Matcher::UrlEncoded("sort".into(), "stars".into()),
        ]))
        .match_header("accept", "application/vnd.github.v3+json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_body())
        .create_async()
        .await;

    let tool = GithubTool::new(Client::new(), server.url());
    let data = tool.execute(&params(json!({"query": "rust", "per_page": 2}))).await.unwrap();

    mock.assert_async().await;
    assert_eq!(data["source"], "github_api");
    assert_eq!(data["total_count"], 1234);
    assert_eq!(data["count"], 2);
    assert_eq!(data["repositories"][0]["full_name"], "tokio-rs/tokio");
    assert_eq!(data["repositories"][0]["created_at"], "2016-09-09");
    assert_eq!(data["repositories"][1]["description"], "No description");
}

#[tokio::test]
async fn test_github_forbidden_is_rate_limit() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/repositories")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let tool = GithubTool::new(Client::new(), server.url());
    let err = tool.execute(&params(json!({"query": "rust"}))).await.unwrap_err();

    assert!(matches!(err, ToolError::RateLimited(_)));
    assert!(err.allows_fallback());
}

#[tokio::test]
async fn test_github_server_error_is_retryable() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/repositories")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let tool = GithubTool::new(Client::new(), server.url());
    let err = tool.execute(&params(json!({"query": "rust"}))).await.unwrap_err();

    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_open_meteo_geocode_then_forecast() {
    let mut server = Server::new_async().await;
    let geocode = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("name".into(), "Berlin".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"results": [{"latitude": 52.52, "longitude": 13.41, "country": "Germany", "admin1": "Land Berlin"}]})
                .to_string(),
        )
        .create_async()
        .await;
    let forecast = server
        .mock("GET", "/forecast")
        .match_query(Matcher::UrlEncoded("latitude".into(), "52.52".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"current": {
                "temperature_2m": 12.5,
                "relative_humidity_2m": 71,
                "apparent_temperature": 10.9,
                "weather_code": 3,
                "wind_speed_10m": 14.2,
                "wind_direction_10m": 250
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let tool = WeatherTool::new(Client::new(), &weather_settings(&server.url(), None));
    let data = tool.current_weather("Berlin").await.unwrap();

    geocode.assert_async().await;
    forecast.assert_async().await;
    assert_eq!(data.country, "Germany");
    assert_eq!(data.region.as_deref(), Some("Land Berlin"));
    assert_eq!(data.temperature, 12.5);
    assert_eq!(data.feels_like, Some(10.9));
    assert_eq!(data.condition, "Overcast");
    assert_eq!(data.source, "open-meteo_api");
}

#[tokio::test]
async fn test_unknown_city_is_not_found() {
    let mut server = Server::new_async().await;
    let _geocode = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"generationtime_ms": 0.5}).to_string())
        .create_async()
        .await;

    let tool = WeatherTool::new(Client::new(), &weather_settings(&server.url(), None));
    let err = tool.current_weather("Atlantis").await.unwrap_err();

    assert!(matches!(err, ToolError::NotFound(_)));
}

#[tokio::test]
async fn test_openweather_used_when_open_meteo_fails() {
    let mut server = Server::new_async().await;
    let _geocode = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let openweather = server
        .mock("GET", "/weather")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "Paris".into()),
            Matcher::UrlEncoded("appid".into(), "secret".into()),
            Matcher::UrlEncoded("units".into(), "metric".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": "Paris",
                "sys": {"country": "FR"},
                "main": {"temp": 18.0, "feels_like": 17.2, "humidity": 60, "pressure": 1012},
                "weather": [{"main": "Clouds", "description": "broken clouds"}],
                "wind": {"speed": 5.0}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tool = WeatherTool::new(Client::new(), &weather_settings(&server.url(), Some("secret")));
    let data = tool.current_weather("Paris").await.unwrap();

    openweather.assert_async().await;
    assert_eq!(data.source, "openweathermap_api");
    assert_eq!(data.country, "FR");
    assert_eq!(data.condition, "Clouds");
    assert_eq!(data.wind_speed, 18.0);
    assert_eq!(data.pressure, Some(1012.0));
}

#[tokio::test]
async fn test_ollama_plan_is_parsed() {
    let mut server = Server::new_async().await;
    let plan_json = json!({
        "plan": [{"step": 1, "description": "Weather", "tool": "weather_tool", "parameters": {"city": "Oslo"}}],
        "reasoning": "User asked about Oslo"
    });
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({"model": "llama3.2", "stream": false, "format": "json"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"response": format!("Here is the plan: {}", plan_json)}).to_string())
        .create_async()
        .await;

    let generator = OllamaGenerator::new(server.url(), "llama3.2".to_string(), Duration::from_secs(5)).unwrap();
    let plan = generator.request_plan("What is the weather in Oslo?").await.unwrap();

    mock.assert_async().await;
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.plan[0].parameters["city"], "Oslo");
    assert_eq!(plan.reasoning, "User asked about Oslo");
}

#[tokio::test]
async fn test_ollama_failure_falls_back_to_rules() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(500)
        .create_async()
        .await;

    let generator = OllamaGenerator::new(server.url(), "llama3.2".to_string(), Duration::from_secs(5)).unwrap();

    let err = generator.request_plan("weather in Tokyo").await.unwrap_err();
    assert!(err.to_string().contains("500"));

    let plan = generator.generate_plan("weather in Tokyo").await.unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.plan[0].tool, "weather_tool");
    assert_eq!(plan.plan[0].parameters["city"], "Tokyo");
}

#[tokio::test]
async fn test_ollama_empty_plan_is_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"response": "{\"plan\": [], \"reasoning\": \"nothing\"}"}).to_string())
        .create_async()
        .await;

    let generator = OllamaGenerator::new(server.url(), "llama3.2".to_string(), Duration::from_secs(5)).unwrap();
    assert!(generator.request_plan("anything").await.is_err());
}
