//! Full pipeline against mocked OpenWeatherMap and NewsAPI servers

use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weathernews::{
    AppConfig, Coordinates, PipelineOrchestrator, PipelineStatus, RunOutcome, Settings,
    StaticPosition, Tier,
};

fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.weather.api_key = Some("weather_key".to_string());
    config.weather.base_url = server.uri();
    config.news.api_key = Some("news_key".to_string());
    config.news.base_url = server.uri();
    config.http.max_retries = 0;
    config.http.timeout_seconds = 5;
    config
}

fn forecast_list() -> serde_json::Value {
    let list: Vec<serde_json::Value> = (0..40)
        .map(|i| {
            json!({
                "dt": 1_736_164_800 + i * 10_800,
                "main": {"temp": 28.0 + (i as f64) / 10.0},
                "weather": [{"description": "clear sky"}]
            })
        })
        .collect();
    json!({ "list": list })
}

#[tokio::test]
async fn test_hot_day_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "41.9028"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"temp": 31.4, "feels_like": 33.0, "humidity": 35},
            "weather": [{"description": "clear sky"}],
            "wind": {"speed": 2.1},
            "visibility": 10000,
            "name": "Rome"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_list()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("category", "general"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "articles": [
                {"title": "Heatwave warning for the capital", "source": {"name": "ANSA"}},
                {"title": "Local team wins derby", "source": {"name": "ANSA"}},
                {"title": null, "description": "risk of storms", "source": {"name": "ANSA"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = PipelineOrchestrator::from_config(
        &config_for(&server),
        Arc::new(StaticPosition(Coordinates::new(41.9028, 12.4964))),
        Settings::default(),
    )
    .unwrap();

    assert_eq!(pipeline.run().await, RunOutcome::Completed);

    let state = pipeline.state();
    assert_eq!(state.status, PipelineStatus::Ready);
    assert_eq!(state.tier, Some(Tier::Hot));
    assert_eq!(state.weather.as_ref().map(|w| w.location_name.as_str()), Some("Rome"));
    assert_eq!(state.forecast.len(), 5);
    assert_eq!(state.news.len(), 3);
    assert_eq!(state.filtered_news.len(), 1);
    assert_eq!(
        state.filtered_news[0].headline(),
        Some("Heatwave warning for the capital")
    );
    assert!(state.location_warning.is_none());
}

#[tokio::test]
async fn test_unauthorized_weather_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_list()))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"articles": []})))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = PipelineOrchestrator::from_config(
        &config_for(&server),
        Arc::new(StaticPosition(Coordinates::new(41.9028, 12.4964))),
        Settings::default(),
    )
    .unwrap();

    let outcome = pipeline.run().await;

    assert_eq!(
        outcome,
        RunOutcome::Failed("HTTP error (401): Invalid API key".to_string())
    );
    assert_eq!(pipeline.state().status, PipelineStatus::Error);
}
