//! News headline model and the categories the news upstream accepts

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single headline as returned by the news upstream
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source_name: String,
    /// Publication time as reported upstream (RFC 3339)
    pub published_at: String,
    pub url: String,
    pub image_url: Option<String>,
}

impl NewsArticle {
    /// Title if present and non-blank
    #[must_use]
    pub fn headline(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Top-headline categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 7] = [
        Self::General,
        Self::Business,
        Self::Entertainment,
        Self::Health,
        Self::Science,
        Self::Sports,
        Self::Technology,
    ];

    /// Identifier used in the upstream query string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Business => "business",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Science => "science",
            Self::Sports => "sports",
            Self::Technology => "technology",
        }
    }

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Business => "Business",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Science => "Science",
            Self::Sports => "Sports",
            Self::Technology => "Technology",
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!(
                    "Unknown news category '{}'. Must be one of: {}",
                    s.trim(),
                    valid.join(", ")
                )
            })
    }
}
