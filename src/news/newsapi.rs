//! NewsAPI top-headlines client

use async_trait::async_trait;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{info, instrument, warn};

use super::NewsSource;
use crate::config::NewsConfig;
use crate::http::get_json;
use crate::models::{NewsArticle, NewsCategory};
use crate::{Result, WeatherNewsError};

/// News API client for newsapi.org
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    country: String,
    page_size: u32,
}

impl NewsApiClient {
    #[must_use]
    pub fn new(config: &NewsConfig, client: ClientWithMiddleware) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            country: config.country.to_ascii_lowercase(),
            page_size: config.page_size,
        }
    }

    fn endpoint(&self, category: NewsCategory) -> Result<Url> {
        let mut params = vec![
            ("category", category.as_str().to_string()),
            ("country", self.country.clone()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("apiKey", key.clone()));
        }

        Url::parse_with_params(&format!("{}/top-headlines", self.base_url), &params)
            .map_err(|e| WeatherNewsError::config(format!("Invalid news API URL: {e}")))
    }

    /// Fetch headlines, propagating every failure.
    #[instrument(skip(self))]
    pub async fn try_fetch_headlines(&self, category: NewsCategory) -> Result<Vec<NewsArticle>> {
        let url = self.endpoint(category)?;
        let response: api::HeadlinesResponse = get_json(&self.client, url).await?;

        if response.status.as_deref() == Some("error") {
            return Err(WeatherNewsError::parse(format!(
                "News API reported an error: {}",
                response.message.unwrap_or_default()
            )));
        }

        let articles: Vec<NewsArticle> = response
            .articles
            .into_iter()
            .flatten()
            .map(api::Article::into_article)
            .collect();
        info!("Retrieved {} {} headlines", articles.len(), category);
        Ok(articles)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch_headlines(&self, category: NewsCategory) -> Vec<NewsArticle> {
        match self.try_fetch_headlines(category).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!("News unavailable, continuing without headlines: {}", e);
                Vec::new()
            }
        }
    }
}

/// NewsAPI response structures
mod api {
    use super::NewsArticle;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct HeadlinesResponse {
        pub status: Option<String>,
        pub message: Option<String>,
        /// Null entries are dropped
        #[serde(default)]
        pub articles: Vec<Option<Article>>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Article {
        pub title: Option<String>,
        pub description: Option<String>,
        pub source: Option<Source>,
        pub published_at: Option<String>,
        pub url: Option<String>,
        pub url_to_image: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Source {
        pub name: Option<String>,
    }

    impl Article {
        pub fn into_article(self) -> NewsArticle {
            NewsArticle {
                title: self.title,
                description: self.description,
                source_name: self.source.and_then(|s| s.name).unwrap_or_default(),
                published_at: self.published_at.unwrap_or_default(),
                url: self.url.unwrap_or_default(),
                image_url: self.url_to_image,
            }
        }
    }
}
