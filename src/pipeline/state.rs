//! Pipeline state and its transition function

use serde::Serialize;

use crate::location_resolver::ResolvedLocation;
use crate::models::{Coordinates, ForecastEntry, NewsArticle, WeatherSnapshot};
use crate::news::Tier;

/// Coarse lifecycle of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PipelineStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub status: PipelineStatus,
    pub weather: Option<WeatherSnapshot>,
    pub forecast: Vec<ForecastEntry>,
    pub news: Vec<NewsArticle>,
    pub filtered_news: Vec<NewsArticle>,
    /// Tier that produced `filtered_news`
    pub tier: Option<Tier>,
    pub loading: bool,
    pub error: Option<String>,
    pub location: Option<Coordinates>,
    /// Set when `location` is the fallback coordinate
    pub location_warning: Option<String>,
}

/// Every way the pipeline state can change
#[derive(Debug, Clone)]
pub enum Action {
    Started,
    LocationResolved(ResolvedLocation),
    WeatherLoaded(WeatherSnapshot),
    WeatherFailed(String),
    ForecastLoaded(Vec<ForecastEntry>),
    NewsLoaded(Vec<NewsArticle>),
    NewsClassified {
        tier: Tier,
        articles: Vec<NewsArticle>,
    },
    ClearError,
}

/// Compute the next state. This is the only place state changes.
#[must_use]
pub fn reduce(state: PipelineState, action: Action) -> PipelineState {
    match action {
        Action::Started => PipelineState {
            status: PipelineStatus::Loading,
            loading: true,
            error: None,
            ..state
        },
        Action::LocationResolved(resolved) => PipelineState {
            location: Some(resolved.coordinates),
            location_warning: resolved.warning,
            ..state
        },
        Action::WeatherLoaded(weather) => PipelineState {
            weather: Some(weather),
            ..state
        },
        Action::WeatherFailed(message) => PipelineState {
            status: PipelineStatus::Error,
            loading: false,
            error: Some(message),
            ..state
        },
        Action::ForecastLoaded(forecast) => PipelineState { forecast, ..state },
        Action::NewsLoaded(news) => PipelineState { news, ..state },
        Action::NewsClassified { tier, articles } => PipelineState {
            status: PipelineStatus::Ready,
            filtered_news: articles,
            tier: Some(tier),
            loading: false,
            error: None,
            ..state
        },
        Action::ClearError => {
            let status = match state.status {
                PipelineStatus::Error => PipelineStatus::Idle,
                other => other,
            };
            PipelineState {
                status,
                error: None,
                ..state
            }
        }
    }
}
