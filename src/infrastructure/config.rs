use crate::application::redraw_scheduler::{
    INTERACTIVE_UPDATE_RATE_MS, MUTE_UPDATE_RATE_MS, UpdateRates,
};
use crate::domain::display::DisplayProperties;
use crate::domain::payload::WEATHER_PATH;
use crate::domain::weather::{TemperatureUnits, WeatherRecord};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub watch_face: WatchFaceSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
    #[serde(default)]
    pub demo: DemoSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncSettings {
    #[serde(default = "default_data_path")]
    pub data_path: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl SyncSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchFaceSettings {
    #[serde(default = "default_interactive_update_rate_ms")]
    pub interactive_update_rate_ms: u64,
    #[serde(default = "default_mute_update_rate_ms")]
    pub mute_update_rate_ms: u64,
    #[serde(default)]
    pub low_bit_ambient: bool,
    #[serde(default)]
    pub burn_in_protection: bool,
}

impl WatchFaceSettings {
    pub fn update_rates(&self) -> UpdateRates {
        UpdateRates {
            interactive_ms: self.interactive_update_rate_ms,
            mute_ms: self.mute_update_rate_ms,
        }
    }

    pub fn display_properties(&self) -> DisplayProperties {
        DisplayProperties {
            low_bit_ambient: self.low_bit_ambient,
            burn_in_protection: self.burn_in_protection,
        }
    }
}

impl Default for WatchFaceSettings {
    fn default() -> Self {
        Self {
            interactive_update_rate_ms: default_interactive_update_rate_ms(),
            mute_update_rate_ms: default_mute_update_rate_ms(),
            low_bit_ambient: false,
            burn_in_protection: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSettings {
    #[serde(default)]
    pub units: TemperatureUnits,
    #[serde(default = "default_icons_dir")]
    pub icons_dir: String,
    /// Seed record for the phone side; without one nothing is published
    #[serde(default)]
    pub record: Option<WeatherRecord>,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            units: TemperatureUnits::default(),
            icons_dir: default_icons_dir(),
            record: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DemoSettings {
    #[serde(default = "default_run_secs")]
    pub run_secs: u64,
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            run_secs: default_run_secs(),
            sync_interval_secs: default_sync_interval_secs(),
        }
    }
}

fn default_data_path() -> String {
    WEATHER_PATH.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_interactive_update_rate_ms() -> u64 {
    INTERACTIVE_UPDATE_RATE_MS
}

fn default_mute_update_rate_ms() -> u64 {
    MUTE_UPDATE_RATE_MS
}

fn default_icons_dir() -> String {
    "assets/icons".to_string()
}

fn default_run_secs() -> u64 {
    10
}

fn default_sync_interval_secs() -> u64 {
    3
}

/// Load `config/watchface.*` if present, then `WATCHFACE__SECTION__KEY` overrides.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/watchface").required(false))
        .add_source(
            config::Environment::with_prefix("WATCHFACE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
