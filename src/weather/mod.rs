//! Weather sources
//!
//! The pipeline depends on these traits rather than on a concrete client so
//! tests can substitute fakes. [`OpenWeatherMapClient`] implements both
//! against the OpenWeatherMap REST API.

use async_trait::async_trait;

use crate::Result;
use crate::models::{Coordinates, ForecastEntry, TemperatureUnit, WeatherSnapshot};

pub mod openweathermap;

pub use openweathermap::OpenWeatherMapClient;

/// Current conditions. Failures are fatal for a pipeline run.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_current(
        &self,
        coords: Coordinates,
        unit: TemperatureUnit,
    ) -> Result<WeatherSnapshot>;
}

/// Daily forecast. Implementations never fail: any problem yields an empty list.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(&self, coords: Coordinates, unit: TemperatureUnit)
    -> Vec<ForecastEntry>;
}
