//! Data models for the weathernews pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: geographic coordinates
//! - Weather: current conditions and temperature units
//! - Forecast: daily forecast entries and downsampling
//! - News: headlines and categories
//! - Settings: user preferences read by the pipeline

pub mod forecast;
pub mod location;
pub mod news;
pub mod settings;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::ForecastEntry;
pub use location::Coordinates;
pub use news::{NewsArticle, NewsCategory};
pub use settings::Settings;
pub use weather::{TemperatureUnit, WeatherSnapshot};
