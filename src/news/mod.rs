//! News headlines and the weather-conditioned headline selection

use async_trait::async_trait;

use crate::models::{NewsArticle, NewsCategory};

pub mod classifier;
pub mod newsapi;

pub use classifier::{MAX_SELECTED, Tier, classify};
pub use newsapi::NewsApiClient;

/// Top headlines for a category. Implementations never fail: any problem yields an empty list.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_headlines(&self, category: NewsCategory) -> Vec<NewsArticle>;
}
