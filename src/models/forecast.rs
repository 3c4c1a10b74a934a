//! Daily forecast entries and the downsampling rule

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw forecast points arrive every 3 hours, so every 8th point is one per day.
pub const POINTS_PER_DAY: usize = 8;

/// Maximum number of daily entries kept
pub const MAX_FORECAST_DAYS: usize = 5;

/// One forecast point, roughly 24 hours apart from its neighbours
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    /// Temperature in the unit the forecast was requested with
    pub temperature: f64,
    pub description: String,
}

impl ForecastEntry {
    /// Short day label such as "Mon, Jan 6"
    #[must_use]
    pub fn day_label(&self) -> String {
        self.timestamp.format("%a, %b %-d").to_string()
    }
}

/// Keep raw points at indices 0, 8, 16, 24, 32 and cap the result at five.
pub fn downsample_daily<T>(points: impl IntoIterator<Item = T>) -> Vec<T> {
    points
        .into_iter()
        .step_by(POINTS_PER_DAY)
        .take(MAX_FORECAST_DAYS)
        .collect()
}
