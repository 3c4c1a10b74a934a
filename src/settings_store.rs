//! Persistence of user settings
//!
//! Settings live as one JSON object under a fixed key. The key-value backend
//! is a `fjall` keyspace; [`MemorySettingsStore`] keeps them for the process
//! lifetime only.

use async_trait::async_trait;
use fjall::Keyspace;
use std::path::Path;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, info, warn};

use crate::models::Settings;
use crate::pipeline::PipelineOrchestrator;
use crate::{Result, WeatherNewsError};

/// Key under which the settings object is stored
pub const SETTINGS_KEY: &str = "settings";

/// Load and save the user's settings
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Raw JSON stored under [`SETTINGS_KEY`], if any
    async fn load_raw(&self) -> Result<Option<String>>;

    /// Overwrite the JSON stored under [`SETTINGS_KEY`]
    async fn save_raw(&self, json: String) -> Result<()>;

    /// Stored settings, or the defaults when nothing usable is stored
    async fn load(&self) -> Result<Settings> {
        let Some(json) = self.load_raw().await? else {
            debug!("No saved settings, using defaults");
            return Ok(Settings::default());
        };

        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) if settings.validate().is_ok() => Ok(settings),
            Ok(_) => {
                warn!("Saved settings have no news categories, using defaults");
                Ok(Settings::default())
            }
            Err(e) => {
                warn!("Error loading settings, using defaults: {}", e);
                Ok(Settings::default())
            }
        }
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.save_raw(json).await
    }
}

/// Settings kept in a `fjall` key-value store on disk
pub struct KeyValueSettingsStore {
    store: Keyspace,
}

fn read_key(store: Keyspace) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(SETTINGS_KEY.as_bytes())?.map(|v| v.to_vec()))
}

impl KeyValueSettingsStore {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = fjall::Database::builder(path)
            .open()
            .map_err(|e| WeatherNewsError::storage(format!("Failed to open settings store: {e}")))?;
        let store = db
            .keyspace("preferences", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| WeatherNewsError::storage(format!("Failed to open settings keyspace: {e}")))?;

        debug!("Opened settings store at {}", path.display());
        Ok(Self { store })
    }
}

#[async_trait]
impl SettingsStore for KeyValueSettingsStore {
    async fn load_raw(&self) -> Result<Option<String>> {
        let store = self.store.clone();
        let bytes = task::spawn_blocking(move || read_key(store))
            .await
            .map_err(|e| WeatherNewsError::storage(e.to_string()))?
            .map_err(|e| WeatherNewsError::storage(e.to_string()))?;

        bytes
            .map(|b| {
                String::from_utf8(b)
                    .map_err(|e| WeatherNewsError::storage(format!("Settings are not UTF-8: {e}")))
            })
            .transpose()
    }

    async fn save_raw(&self, json: String) -> Result<()> {
        let store = self.store.clone();
        task::spawn_blocking(move || store.insert(SETTINGS_KEY.as_bytes().to_vec(), json.into_bytes()))
            .await
            .map_err(|e| WeatherNewsError::storage(e.to_string()))?
            .map_err(|e| WeatherNewsError::storage(e.to_string()))?;
        Ok(())
    }
}

/// Settings kept in memory
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    value: Mutex<Option<String>>,
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load_raw(&self) -> Result<Option<String>> {
        Ok(self.value.lock().await.clone())
    }

    async fn save_raw(&self, json: String) -> Result<()> {
        *self.value.lock().await = Some(json);
        Ok(())
    }
}

/// Validate, persist, then apply new settings to the pipeline.
///
/// Invalid settings are rejected before the store is touched.
pub async fn save_settings(
    store: &dyn SettingsStore,
    pipeline: &PipelineOrchestrator,
    settings: Settings,
) -> Result<()> {
    settings.validate()?;
    store.save(&settings).await?;
    pipeline.apply_settings(settings.clone())?;
    info!(
        "Settings saved: {} with categories {:?}",
        settings.temperature_unit.unit_system(),
        settings.news_categories
    );
    Ok(())
}

/// Persist and apply the default settings
pub async fn reset_settings(
    store: &dyn SettingsStore,
    pipeline: &PipelineOrchestrator,
) -> Result<Settings> {
    let defaults = Settings::default();
    save_settings(store, pipeline, defaults.clone()).await?;
    Ok(defaults)
}
