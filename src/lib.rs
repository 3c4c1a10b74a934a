//! `WeatherNews` - weather-conditioned news headlines
//!
//! This library resolves the device location, fetches current conditions and
//! a five day forecast, and picks news headlines whose mood matches the
//! temperature outside.

pub mod config;
pub mod error;
pub mod http;
pub mod location_resolver;
pub mod models;
pub mod news;
pub mod pipeline;
pub mod settings_store;
pub mod telemetry;
pub mod weather;

// Re-export core types for public API
pub use config::AppConfig;
pub use error::{LocationError, WeatherNewsError};
pub use location_resolver::{
    LocationResolver, PositionProvider, PositionRequest, ResolvedLocation, StaticPosition,
    UnavailablePosition,
};
pub use models::{
    Coordinates, ForecastEntry, NewsArticle, NewsCategory, Settings, TemperatureUnit,
    WeatherSnapshot,
};
pub use news::{NewsApiClient, NewsSource, Tier, classify};
pub use pipeline::{PipelineOrchestrator, PipelineState, PipelineStatus, RunOutcome};
pub use settings_store::{
    KeyValueSettingsStore, MemorySettingsStore, SettingsStore, reset_settings, save_settings,
};
pub use weather::{ForecastSource, OpenWeatherMapClient, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherNewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
