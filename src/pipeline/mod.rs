//! Pipeline orchestration
//!
//! [`PipelineOrchestrator`] runs location → weather → forecast → news →
//! classification strictly in that order. Only the weather step can fail a
//! run; forecast and news degrade to empty lists. Every state change goes
//! through [`state::reduce`] and is published on a watch channel.

use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{error, info, instrument, warn};

use crate::config::AppConfig;
use crate::http::build_client;
use crate::location_resolver::{LocationResolver, PositionProvider, PositionRequest};
use crate::models::{Coordinates, Settings};
use crate::news::{NewsApiClient, NewsSource, Tier, classify};
use crate::weather::{ForecastSource, OpenWeatherMapClient, WeatherSource};

pub mod state;

pub use state::{Action, PipelineState, PipelineStatus, reduce};

/// How a call to `run` or `refresh` ended
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum RunOutcome {
    /// Weather, forecast and news were loaded; state is Ready
    Completed,
    /// The weather step failed; state is Error with this message
    Failed(String),
    /// Another run was in flight; nothing was done
    AlreadyRunning,
}

/// Owns the pipeline state and sequences the upstream calls
pub struct PipelineOrchestrator {
    resolver: LocationResolver,
    weather: Arc<dyn WeatherSource>,
    forecast: Arc<dyn ForecastSource>,
    news: Arc<dyn NewsSource>,
    settings: watch::Sender<Settings>,
    state: watch::Sender<PipelineState>,
    in_flight: Mutex<()>,
}

impl PipelineOrchestrator {
    pub fn new(
        resolver: LocationResolver,
        weather: Arc<dyn WeatherSource>,
        forecast: Arc<dyn ForecastSource>,
        news: Arc<dyn NewsSource>,
        settings: Settings,
    ) -> Self {
        let (settings, _) = watch::channel(settings);
        let (state, _) = watch::channel(PipelineState::default());
        Self {
            resolver,
            weather,
            forecast,
            news,
            settings,
            state,
            in_flight: Mutex::new(()),
        }
    }

    /// Wire the OpenWeatherMap and NewsAPI clients from configuration
    pub fn from_config(
        config: &AppConfig,
        position: Arc<dyn PositionProvider>,
        settings: Settings,
    ) -> crate::Result<Self> {
        let http = build_client(&config.http)?;
        let owm = Arc::new(OpenWeatherMapClient::new(&config.weather, http.clone()));
        let news = Arc::new(NewsApiClient::new(&config.news, http));
        let resolver = LocationResolver::new(position, PositionRequest::from(&config.location));

        Ok(Self::new(resolver, owm.clone(), owm, news, settings))
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Settings the next run will use
    pub fn settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    /// Replace the active settings. Rejected if no news category is selected.
    pub fn apply_settings(&self, settings: Settings) -> crate::Result<()> {
        settings.validate()?;
        self.settings.send_replace(settings);
        Ok(())
    }

    /// Full run: resolve the location, then fetch and classify.
    ///
    /// Rejected with [`RunOutcome::AlreadyRunning`] while another run or
    /// refresh is in flight.
    #[instrument(skip(self))]
    pub async fn run(&self) -> RunOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Pipeline run requested while another is in flight, ignoring");
            return RunOutcome::AlreadyRunning;
        };

        self.dispatch(Action::Started);
        let coords = self.resolve_location().await;
        self.fetch_from(coords).await
    }

    /// Clear any error and run again, reusing the known location if there is one.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RunOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Pipeline refresh requested while another run is in flight, ignoring");
            return RunOutcome::AlreadyRunning;
        };

        self.dispatch(Action::ClearError);
        self.dispatch(Action::Started);

        let known = self.state.borrow().location;
        let coords = match known {
            Some(coords) => coords,
            None => self.resolve_location().await,
        };
        self.fetch_from(coords).await
    }

    fn dispatch(&self, action: Action) {
        self.state.send_modify(|state| {
            let previous = std::mem::take(state);
            *state = reduce(previous, action);
        });
    }

    async fn resolve_location(&self) -> Coordinates {
        let resolved = self.resolver.resolve().await;
        let coords = resolved.coordinates;
        self.dispatch(Action::LocationResolved(resolved));
        coords
    }

    async fn fetch_from(&self, coords: Coordinates) -> RunOutcome {
        let settings = self.settings();
        let unit = settings.temperature_unit;

        let weather = match self.weather.fetch_current(coords, unit).await {
            Ok(weather) => weather,
            Err(e) => {
                error!("Weather fetch failed: {}", e);
                let message = e.to_string();
                self.dispatch(Action::WeatherFailed(message.clone()));
                return RunOutcome::Failed(message);
            }
        };
        let celsius = weather.temperature_celsius();
        self.dispatch(Action::WeatherLoaded(weather));

        let forecast = self.forecast.fetch_forecast(coords, unit).await;
        self.dispatch(Action::ForecastLoaded(forecast));

        let category = settings.primary_category();
        let articles = self.news.fetch_headlines(category).await;
        let tier = Tier::for_temperature(celsius);
        let selected = classify(celsius, &articles);
        info!(
            "Selected {} of {} {} headlines for {:.1}°C ({:?})",
            selected.len(),
            articles.len(),
            category,
            celsius,
            tier
        );

        self.dispatch(Action::NewsLoaded(articles));
        self.dispatch(Action::NewsClassified {
            tier,
            articles: selected,
        });
        RunOutcome::Completed
    }
}
