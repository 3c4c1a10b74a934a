use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use weathernews::location_resolver::UnavailablePosition;
use weathernews::{
    AppConfig, Coordinates, KeyValueSettingsStore, NewsCategory, PipelineOrchestrator,
    PipelineState, PositionProvider, RunOutcome, Settings, SettingsStore, StaticPosition,
    TemperatureUnit, reset_settings, save_settings, telemetry,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Current weather, a five day forecast and headlines to match", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch weather, forecast and headlines once
    Run(RunArgs),
    /// Show or change the saved settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Latitude to use instead of the device position
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude to use instead of the device position
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print the saved settings
    Show,
    /// Change the temperature unit or news categories
    Set(SetArgs),
    /// Restore the default settings
    Reset,
}

#[derive(Args, Debug)]
struct SetArgs {
    /// Temperature unit (celsius or fahrenheit)
    #[arg(long)]
    unit: Option<TemperatureUnit>,

    /// Comma separated news categories; the first one is fetched
    #[arg(long, value_delimiter = ',')]
    categories: Option<Vec<NewsCategory>>,

    /// Add or remove a single category
    #[arg(long)]
    toggle: Vec<NewsCategory>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from_path(cli.config.clone())?;
    telemetry::init_tracing(&config.logging, cli.verbose)?;
    debug!("Loaded configuration: {:?}", config.storage);

    let store = KeyValueSettingsStore::open(&config.storage.settings_path)
        .with_context(|| format!("Failed to open settings at {}", config.storage.settings_path))?;

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run(&config, &store, args).await,
        Command::Settings(SettingsCommand::Show) => {
            let settings = store.load().await?;
            print_settings(&settings);
            Ok(())
        }
        Command::Settings(SettingsCommand::Set(args)) => {
            let current = store.load().await?;
            let mut settings = current.clone();
            if let Some(unit) = args.unit {
                settings.temperature_unit = unit;
            }
            if let Some(categories) = args.categories {
                settings.news_categories = categories;
            }
            for category in args.toggle {
                settings.toggle_category(category);
            }

            let pipeline = orchestrator(&config, Arc::new(UnavailablePosition), current)?;
            if let Err(e) = save_settings(&store, &pipeline, settings.clone()).await {
                eprintln!("{}", e.user_message());
                return Err(e.into());
            }
            print_settings(&settings);
            Ok(())
        }
        Command::Settings(SettingsCommand::Reset) => {
            let pipeline = orchestrator(&config, Arc::new(UnavailablePosition), Settings::default())?;
            let settings = reset_settings(&store, &pipeline).await?;
            info!("Settings reset to defaults");
            print_settings(&settings);
            Ok(())
        }
    }
}

fn orchestrator(
    config: &AppConfig,
    position: Arc<dyn PositionProvider>,
    settings: Settings,
) -> Result<PipelineOrchestrator> {
    PipelineOrchestrator::from_config(config, position, settings)
        .context("Failed to set up the pipeline")
}

/// Command line coordinates win over the configured position
fn position_provider(config: &AppConfig, args: &RunArgs) -> Arc<dyn PositionProvider> {
    let fixed = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => config.location.fixed_position(),
    };

    match fixed {
        Some(coords) => {
            debug!("Using fixed position {}", coords.format_coordinates());
            Arc::new(StaticPosition(coords))
        }
        None => Arc::new(UnavailablePosition),
    }
}

async fn run(config: &AppConfig, store: &KeyValueSettingsStore, args: RunArgs) -> Result<()> {
    if config.weather.api_key.is_none() {
        warn!("No weather API key configured (set WEATHERNEWS_WEATHER__API_KEY)");
    }
    if config.news.api_key.is_none() {
        warn!("No news API key configured (set WEATHERNEWS_NEWS__API_KEY)");
    }

    let settings = store.load().await?;
    let pipeline = orchestrator(config, position_provider(config, &args), settings)?;

    match pipeline.run().await {
        RunOutcome::Completed => {
            print_state(&pipeline.state());
            Ok(())
        }
        RunOutcome::Failed(message) => {
            let state = pipeline.state();
            if let Some(warning) = &state.location_warning {
                eprintln!("{warning}");
            }
            anyhow::bail!("Failed to load weather: {message}")
        }
        RunOutcome::AlreadyRunning => {
            // one run per process, so the guard never rejects here
            debug!("Pipeline already running, nothing to print");
            Ok(())
        }
    }
}

fn print_state(state: &PipelineState) {
    if let Some(warning) = &state.location_warning {
        println!("! {warning}");
    }

    if let Some(weather) = &state.weather {
        println!("{} - {}", weather.location_name, weather.description);
        println!(
            "  {} (feels like {:.0}{})",
            weather.format_temperature(),
            weather.feels_like,
            weather.unit.symbol()
        );
        println!(
            "  Humidity {}%  Wind {}  Visibility {}",
            weather.humidity,
            weather.format_wind(),
            weather.format_visibility()
        );

        if !state.forecast.is_empty() {
            println!();
            println!("Forecast");
            for entry in &state.forecast {
                println!(
                    "  {:<12} {:>4.0}{}  {}",
                    entry.day_label(),
                    entry.temperature,
                    weather.unit.symbol(),
                    entry.description
                );
            }
        }
    }

    if let Some(tier) = state.tier {
        println!();
        println!("{}", tier.headline());
        println!("  {}", tier.description());
    }

    if state.filtered_news.is_empty() {
        println!("  No headlines available");
    }
    for article in &state.filtered_news {
        println!(
            "  * {} ({})",
            article.headline().unwrap_or("Untitled"),
            article.source_name
        );
    }
}

fn print_settings(settings: &Settings) {
    let categories: Vec<&str> = settings
        .news_categories
        .iter()
        .map(|c| c.label())
        .collect();
    println!(
        "Temperature unit: {} ({})",
        settings.temperature_unit.unit_system(),
        settings.temperature_unit.symbol()
    );
    println!("News categories: {}", categories.join(", "));
}
