//! User preferences read by the pipeline

use super::{NewsCategory, TemperatureUnit};
use crate::error::WeatherNewsError;
use serde::{Deserialize, Serialize};

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
    #[serde(default = "default_news_categories")]
    pub news_categories: Vec<NewsCategory>,
}

fn default_news_categories() -> Vec<NewsCategory> {
    vec![
        NewsCategory::General,
        NewsCategory::Technology,
        NewsCategory::Sports,
        NewsCategory::Entertainment,
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::default(),
            news_categories: default_news_categories(),
        }
    }
}

impl Settings {
    /// The only category the pipeline fetches headlines for
    #[must_use]
    pub fn primary_category(&self) -> NewsCategory {
        self.news_categories.first().copied().unwrap_or_default()
    }

    /// Settings must carry at least one news category before they are stored
    pub fn validate(&self) -> crate::Result<()> {
        if self.news_categories.is_empty() {
            return Err(WeatherNewsError::validation(
                "No categories selected. Please select at least one news category.",
            ));
        }
        Ok(())
    }

    /// Add the category if missing, remove it otherwise
    pub fn toggle_category(&mut self, category: NewsCategory) {
        if let Some(pos) = self.news_categories.iter().position(|c| *c == category) {
            self.news_categories.remove(pos);
        } else {
            self.news_categories.push(category);
        }
    }
}
