//! Current weather model and display methods

use serde::{Deserialize, Serialize};

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Unit system name understood by the weather upstream
    #[must_use]
    pub fn unit_system(self) -> &'static str {
        match self {
            Self::Celsius => "metric",
            Self::Fahrenheit => "imperial",
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Wind speed unit the upstream reports in this unit system
    #[must_use]
    pub fn wind_speed_unit(self) -> &'static str {
        match self {
            Self::Celsius => "m/s",
            Self::Fahrenheit => "mph",
        }
    }

    /// Convert a temperature expressed in this unit to Celsius
    #[must_use]
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "celsius" | "c" | "metric" => Ok(Self::Celsius),
            "fahrenheit" | "f" | "imperial" => Ok(Self::Fahrenheit),
            other => Err(format!(
                "Unknown temperature unit '{other}'. Must be one of: celsius, fahrenheit"
            )),
        }
    }
}

/// Current conditions at a location, in the unit it was requested with
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    pub wind_speed: f64,
    /// Visibility in meters
    pub visibility: u32,
    pub description: String,
    pub location_name: String,
    pub unit: TemperatureUnit,
}

impl WeatherSnapshot {
    /// Temperature normalized to Celsius, as the classifier expects
    #[must_use]
    pub fn temperature_celsius(&self) -> f64 {
        self.unit.to_celsius(self.temperature)
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.0}{}", self.temperature, self.unit.symbol())
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} {}", self.wind_speed, self.unit.wind_speed_unit())
    }

    /// Format visibility in kilometers
    #[must_use]
    pub fn format_visibility(&self) -> String {
        format!("{:.1} km", f64::from(self.visibility) / 1000.0)
    }
}
