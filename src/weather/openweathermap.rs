//! OpenWeatherMap client for current conditions and the 5 day / 3 hour forecast

use async_trait::async_trait;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Instant;
use tracing::{info, instrument, warn};

use super::{ForecastSource, WeatherSource};
use crate::config::WeatherConfig;
use crate::http::get_json;
use crate::models::forecast::downsample_daily;
use crate::models::{Coordinates, ForecastEntry, TemperatureUnit, WeatherSnapshot};
use crate::{Result, WeatherNewsError};

/// Weather API client for OpenWeatherMap
#[derive(Debug, Clone)]
pub struct OpenWeatherMapClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherMapClient {
    /// Create a new weather API client on top of a shared HTTP client
    #[must_use]
    pub fn new(config: &WeatherConfig, client: ClientWithMiddleware) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, resource: &str, coords: Coordinates, unit: TemperatureUnit) -> Result<Url> {
        let mut params = vec![
            ("lat", coords.latitude.to_string()),
            ("lon", coords.longitude.to_string()),
            ("units", unit.unit_system().to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("appid", key.clone()));
        }

        Url::parse_with_params(&format!("{}/{resource}", self.base_url), &params)
            .map_err(|e| WeatherNewsError::config(format!("Invalid weather API URL: {e}")))
    }

    /// Fetch the forecast, propagating every failure.
    ///
    /// [`ForecastSource::fetch_forecast`] wraps this and degrades to an empty list.
    #[instrument(skip(self), fields(lat = coords.latitude, lon = coords.longitude))]
    pub async fn try_fetch_forecast(
        &self,
        coords: Coordinates,
        unit: TemperatureUnit,
    ) -> Result<Vec<ForecastEntry>> {
        let start_time = Instant::now();
        let url = self.endpoint("forecast", coords, unit)?;

        let response: api::ForecastResponse = get_json(&self.client, url).await?;
        let raw_points = response.list.len();
        let entries: Vec<ForecastEntry> = downsample_daily(response.list)
            .into_iter()
            .map(api::ForecastPoint::into_entry)
            .collect();

        info!(
            "Retrieved forecast: {} raw points reduced to {} days in {:.3}s",
            raw_points,
            entries.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(entries)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMapClient {
    #[instrument(skip(self), fields(lat = coords.latitude, lon = coords.longitude))]
    async fn fetch_current(
        &self,
        coords: Coordinates,
        unit: TemperatureUnit,
    ) -> Result<WeatherSnapshot> {
        info!("Getting current weather for coordinates: {}", coords.format_coordinates());
        let start_time = Instant::now();
        let url = self.endpoint("weather", coords, unit)?;

        let response: api::CurrentResponse = get_json(&self.client, url).await?;
        let snapshot = response.into_snapshot(unit);

        let total_duration = start_time.elapsed();
        info!(
            "Current weather for {}: {} ({}) in {:.3}s",
            snapshot.location_name,
            snapshot.format_temperature(),
            snapshot.description,
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!("Slow weather API response: {:.3}s", total_duration.as_secs_f64());
        }

        Ok(snapshot)
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherMapClient {
    async fn fetch_forecast(
        &self,
        coords: Coordinates,
        unit: TemperatureUnit,
    ) -> Vec<ForecastEntry> {
        match self.try_fetch_forecast(coords, unit).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Forecast unavailable, continuing with current weather only: {}", e);
                Vec::new()
            }
        }
    }
}

/// OpenWeatherMap response structures and conversion utilities
mod api {
    use super::{ForecastEntry, TemperatureUnit, WeatherSnapshot};
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub main: MainBlock,
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub wind: Wind,
        pub visibility: f64,
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainBlock {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastPoint>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastPoint {
        pub dt: i64,
        pub main: ForecastMain,
        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastMain {
        pub temp: f64,
    }

    fn first_description(conditions: Vec<Condition>) -> String {
        conditions
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_else(|| "unknown".to_string())
    }

    impl CurrentResponse {
        pub fn into_snapshot(self, unit: TemperatureUnit) -> WeatherSnapshot {
            WeatherSnapshot {
                temperature: self.main.temp,
                feels_like: self.main.feels_like,
                humidity: self.main.humidity.round().clamp(0.0, 100.0) as u8,
                wind_speed: self.wind.speed,
                visibility: self.visibility.max(0.0).round() as u32,
                description: first_description(self.weather),
                location_name: self.name,
                unit,
            }
        }
    }

    impl ForecastPoint {
        pub fn into_entry(self) -> ForecastEntry {
            let timestamp = DateTime::<Utc>::from_timestamp(self.dt, 0).unwrap_or_else(|| {
                tracing::debug!("Forecast point has out of range timestamp {}", self.dt);
                DateTime::<Utc>::default()
            });
            ForecastEntry {
                timestamp,
                temperature: self.main.temp,
                description: first_description(self.weather),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::http::build_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenWeatherMapClient {
        let http = build_client(&HttpConfig {
            timeout_seconds: 5,
            max_retries: 0,
        })
        .unwrap();
        let config = WeatherConfig {
            api_key: Some("test_weather_key".to_string()),
            base_url: server.uri(),
        };
        OpenWeatherMapClient::new(&config, http)
    }

    fn current_body() -> serde_json::Value {
        json!({
            "main": {"temp": 5.2, "feels_like": 1.9, "humidity": 81},
            "weather": [{"description": "light rain"}],
            "wind": {"speed": 4.6},
            "visibility": 9000,
            "name": "Brooklyn"
        })
    }

    fn forecast_body(points: usize) -> serde_json::Value {
        let list: Vec<serde_json::Value> = (0..points)
            .map(|i| {
                json!({
                    "dt": 1_700_000_000 + (i as i64) * 10_800,
                    "main": {"temp": i as f64},
                    "weather": [{"description": format!("point {i}")}]
                })
            })
            .collect();
        json!({ "list": list })
    }

    #[tokio::test]
    async fn test_fetch_current_sends_units_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("units", "imperial"))
            .and(query_param("appid", "test_weather_key"))
            .and(query_param("lat", "40.7128"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;

        let weather = client_for(&server)
            .fetch_current(Coordinates::FALLBACK, TemperatureUnit::Fahrenheit)
            .await
            .unwrap();

        assert_eq!(weather.temperature, 5.2);
        assert_eq!(weather.feels_like, 1.9);
        assert_eq!(weather.humidity, 81);
        assert_eq!(weather.wind_speed, 4.6);
        assert_eq!(weather.visibility, 9000);
        assert_eq!(weather.description, "light rain");
        assert_eq!(weather.location_name, "Brooklyn");
        assert_eq!(weather.unit, TemperatureUnit::Fahrenheit);
    }

    #[tokio::test]
    async fn test_fetch_current_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_current(Coordinates::FALLBACK, TemperatureUnit::Celsius)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[tokio::test]
    async fn test_fetch_current_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Nowhere"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_current(Coordinates::FALLBACK, TemperatureUnit::Celsius)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherNewsError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_forecast_downsamples_to_daily() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40)))
            .mount(&server)
            .await;

        let forecast = client_for(&server)
            .fetch_forecast(Coordinates::FALLBACK, TemperatureUnit::Celsius)
            .await;

        let temps: Vec<f64> = forecast.iter().map(|f| f.temperature).collect();
        assert_eq!(temps, vec![0.0, 8.0, 16.0, 24.0, 32.0]);
        assert_eq!(forecast[1].description, "point 8");
        assert_eq!(forecast[0].timestamp.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_fetch_forecast_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let forecast = client
            .fetch_forecast(Coordinates::FALLBACK, TemperatureUnit::Celsius)
            .await;
        assert!(forecast.is_empty());

        let err = client
            .try_fetch_forecast(Coordinates::FALLBACK, TemperatureUnit::Celsius)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_fetch_forecast_unreachable_upstream() {
        let http = build_client(&HttpConfig {
            timeout_seconds: 1,
            max_retries: 0,
        })
        .unwrap();
        let config = WeatherConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
        };
        let forecast = OpenWeatherMapClient::new(&config, http)
            .fetch_forecast(Coordinates::FALLBACK, TemperatureUnit::Celsius)
            .await;
        assert!(forecast.is_empty());
    }
}
